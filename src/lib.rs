#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

mod constants;
mod dispatcher;
mod error;
mod formatter;
mod globals;
mod level;
mod locale;
mod logger;
mod macros;
mod message;
mod receiver;
mod text;

pub use error::{ProducerError, SinkError};
pub use formatter::{Formatter, MessageTemplate, Placeholder, TemplateElement};
pub use globals::get_global_logger;
pub use level::LogLevel;
pub use locale::{Locale, format_bool, format_f64};
pub use logger::{Logger, LoggerOptions};
pub use message::{CallSite, Exception, LogMessage};
pub use receiver::{
    CollectorReceiver, ConsoleReceiver, HtmlFileReceiver, LatePolicy, MessageReceivedEvent,
    Receiver, ReceiverConfig, ReceiverMode, SeverityBridgeReceiver,
};
pub use text::{LogColor, LogStyle, LogText, LogTextItem, RenderProfile};
