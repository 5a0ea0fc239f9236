use log::LevelFilter;

/// Initialize logging for the embedding application and tests.
/// Should be called once at process start.
pub fn init_logging() {
    // The host may have installed its own logger already; keep whatever
    // is in place in that case.
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Info)
        .try_init();
}
