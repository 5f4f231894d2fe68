use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "photo-squeeze",
    about = "Batch-resize photos and compress them with TinyPNG",
    long_about = "photo-squeeze resizes every JPEG and PNG in a folder so its longer side fits a \
                  maximum dimension, optionally compresses the results with the TinyPNG API, and \
                  copies the original EXIF tags back onto the finished files.",
    version,
    after_help = "EXAMPLES:\n  \
    photo-squeeze run -i ./photos\n  \
    photo-squeeze run -i ./photos -o ./web --resize --compress -d 1600 -k <API_KEY>\n  \
    photo-squeeze settings set --api-key <API_KEY>\n  \
    photo-squeeze quota"
)]
pub struct Args {
    #[arg(
        long,
        global = true,
        help = "Settings file (default: <config dir>/photo-squeeze/settings.json)"
    )]
    pub settings: Option<PathBuf>,

    #[arg(short = 'q', long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print diagnostic details")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Resize and/or compress every image in a folder",
        long_about = "Process every .jpg, .jpeg and .png file of the input folder in order. \
                      Without --resize or --compress the images are only resized. \
                      The first failure stops the batch."
    )]
    Run(RunArgs),

    #[command(about = "Show how many TinyPNG compressions are left this month")]
    Quota {
        #[arg(short = 'k', long = "key", help = "TinyPNG API key (default: saved key)")]
        api_key: Option<String>,
    },

    #[command(about = "Show or change saved settings")]
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    #[arg(short = 'i', long = "input", help = "Input folder")]
    pub input: PathBuf,

    #[arg(
        short = 'o',
        long = "output",
        help = "Output folder (default: the input folder)",
        long_help = "Folder the resized and compressed files are written to. \
                     Created when it does not exist. Defaults to the input folder."
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Resize images")]
    pub resize: bool,

    #[arg(
        long,
        help = "Compress images with TinyPNG",
        long_help = "Upload every image (after resizing, when enabled) to TinyPNG and keep the \
                     compressed result. Requires an API key via -k or saved settings. \
                     Limited to 500 compressions per month."
    )]
    pub compress: bool,

    #[arg(
        short = 'd',
        long = "max-dimension",
        default_value_t = 1200,
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Maximum size of the longer side"
    )]
    pub max_dimension: u32,

    #[arg(
        short = 'u',
        long,
        default_value = "px",
        help = "Unit of the maximum dimension (px, in, cm)",
        long_help = "Unit of --max-dimension. Inches and centimetres are converted at 100 dpi."
    )]
    pub unit: String,

    #[arg(short = 'k', long = "key", help = "TinyPNG API key (default: saved key)")]
    pub api_key: Option<String>,

    #[arg(short = 'r', long, help = "Also process subfolders")]
    pub recursive: bool,

    #[arg(long, help = "Do not copy EXIF tags onto the results")]
    pub no_metadata: bool,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Metadata TinyPNG should keep (copyright, creation, location)"
    )]
    pub preserve: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    #[command(about = "Print the saved settings")]
    Show,

    #[command(about = "Save one or more settings")]
    Set {
        #[arg(long)]
        api_key: Option<String>,

        #[arg(long)]
        input_folder: Option<PathBuf>,

        #[arg(long)]
        output_folder: Option<PathBuf>,
    },
}
