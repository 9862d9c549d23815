const PARAM_VALUE_DELIMITER: char = ',';
const VALUE_DELIMITER: char = ':';
const PARAM_DELIMITER: char = ';';
const PARAM_NAME_DELIMITER: char = '=';
const PARAM_QUOTE: char = '"';
const LINE_TERMINATOR: &str = "\r\n";

pub mod component;
pub use component::*;

pub mod parser;
pub use parser::{CalendarParser, Lexer, ParserError, ParserOptions, parse};

pub mod property;

pub mod types;
