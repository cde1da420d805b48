// src/backend/utils/log.rs
// Canister logging. Debug printing is only available inside a canister, so
// native builds (unit tests) fall back to stderr.

pub fn emit(level: &str, message: &str) {
    #[cfg(target_arch = "wasm32")]
    ic_cdk::println!("{}: {}", level, message);
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{}: {}", level, message);
}

macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::utils::log::emit("INFO", &format!($($arg)*))
    };
}

macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::utils::log::emit("WARN", &format!($($arg)*))
    };
}

pub(crate) use log_info;
pub(crate) use log_warn;
