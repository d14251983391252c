pub mod replies;
pub mod report_fmt;
