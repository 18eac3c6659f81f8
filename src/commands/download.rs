use crate::{
    cli::DownloadArgs,
    io::{download::download_grch38_reference, readers::check_reference_fasta},
    utils::util::Result,
};
use std::fs;

pub fn download_reference(args: DownloadArgs) -> Result<()> {
    fs::create_dir_all(&args.output_dir).map_err(|e| {
        crate::pgx_error!(
            "Cannot create output directory {}: {e}",
            args.output_dir.display()
        )
    })?;
    let reference = download_grch38_reference(&args.output_dir, args.save_as.as_deref())?;
    check_reference_fasta(&reference)?;
    log::info!("Reference genome ready at {}", reference.display());
    Ok(())
}
