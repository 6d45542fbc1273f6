pub mod codegen;
pub mod error;
pub mod parse;

#[cfg(test)]
mod tests;
