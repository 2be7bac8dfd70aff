pub mod http;
pub mod prober;
pub mod scan;
pub mod tls;
