/// Middleware module
///
/// Request logging and the static file hit counter.

mod hit_counter;
mod request_logger;

pub use hit_counter::HitCounter;
pub use request_logger::RequestLogger;
