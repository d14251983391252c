pub mod http_oracle;
pub mod static_oracle;

pub use http_oracle::HttpHealthOracle;
pub use static_oracle::StaticHealthOracle;
