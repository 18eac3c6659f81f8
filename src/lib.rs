pub mod cli;
pub mod commands;
pub mod error;

pub mod core {
    pub mod chromosome;
    pub mod regions;
}

pub mod io {
    pub mod bcftools;
    pub mod command;
    pub mod download;
    pub mod readers;
    pub mod vcf_reader;
}

pub mod utils {
    pub mod util;
    pub mod util_intern;
}

pub mod constants;

pub use constants::*;
