/// Log filter for the given `-v` count
///
/// Without `-v`, `fallback` (the configured level) is used.
pub fn get_log_level(verbose: u8, fallback: &str) -> String {
    match verbose {
        0 => fallback.to_string(),
        1 => "debug".to_string(),
        2 => "trace".to_string(),
        _ => "trace,hyper=debug,reqwest=debug".to_string(), // -vvv shows everything including dependencies
    }
}
