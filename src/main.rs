use crate::cli::run;

pub mod cli;
pub mod codec;
pub mod config;
pub mod domain;
pub mod http;
pub mod library;
pub mod registry;
#[cfg(test)]
mod test_utils;

fn main() -> anyhow::Result<()> {
    run()
}
