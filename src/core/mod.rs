pub mod analysis;
pub mod engine;
pub mod lotto;
pub mod pages;
pub mod parser;
pub mod plot;
pub mod quadratic;

pub use crate::domain::model::{RationalFunctionInput, Rendered, StandardForm};
pub use crate::domain::ports::{DrawSource, Page, Storage};
pub use crate::utils::error::Result;
