use anyhow::Result;

/// The reminder loop owns all prompt state, so it only ever runs on a single thread.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
