use std::{error::Error, path::PathBuf};

use autogamess::{config::Config, die, plot};
use clap::{Parser, Subcommand};
use gamess::{
    input::Input,
    opt2hes::{ForceMethod, opt2hes_with},
    templates::Templates,
};
use log::debug;

/// generate and convert GAMESS(US) input files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a hessian input file at the geometry found by a finished
    /// optimization. The new file replaces the _opt in the name of OPTFILE with
    /// _hes.
    Opt2hes {
        /// the input file of the optimization
        optfile: PathBuf,

        /// the log file written by the optimization
        logfile: PathBuf,

        /// Override the force method chosen from the file name, either seminum
        /// or fullnum.
        #[arg(short, long)]
        method: Option<ForceMethod>,
    },

    /// Write the input groups for a template name or a .txt file of GAMESS
    /// groups
    Input {
        template: String,

        /// Load the templates from this TOML file instead of the built-in
        /// ones.
        #[arg(short, long)]
        templates: Option<PathBuf>,

        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// The comment written on the first line.
        #[arg(short, long, default_value_t = String::from("autogamess"))]
        comment: String,

        /// Serialize the parameters to JSON instead.
        #[arg(short, long, default_value_t = false)]
        json: bool,
    },

    /// Draw the plot described by a TOML file
    Plot {
        #[arg(value_parser, default_value_t = String::from("plot.toml"))]
        config: String,
    },

    /// List the available template names
    Templates {
        #[arg(short, long)]
        templates: Option<PathBuf>,
    },
}

fn load_templates(path: Option<PathBuf>) -> Templates {
    match path {
        Some(path) => Templates::load(&path).unwrap_or_else(|e| {
            die!("failed to load templates from {}: {e}", path.display())
        }),
        None => Templates::builtin().clone(),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    debug!("{args:?}");
    match args.command {
        Command::Opt2hes {
            optfile,
            logfile,
            method,
        } => {
            let hesfile = opt2hes_with(&optfile, &logfile, method)
                .unwrap_or_else(|e| {
                    die!("failed to convert {}: {e}", optfile.display())
                });
            println!("{}", hesfile.display());
        }
        Command::Input {
            template,
            templates,
            output,
            comment,
            json,
        } => {
            let templates = load_templates(templates);
            let input = Input::with_templates(&template, &templates)
                .unwrap_or_else(|e| die!("failed to build input: {e}"));
            if json {
                println!("{}", serde_json::to_string_pretty(&input)?);
            } else if let Some(output) = output {
                input.write_inp(&output, &comment)?;
            } else {
                print!("{}", input.to_inp(&comment));
            }
        }
        Command::Plot { config } => {
            let config = Config::load(&config).unwrap_or_else(|e| {
                die!("failed to load config file {config}: {e}")
            });
            debug!("{config}");
            plot(&config).unwrap_or_else(|e| die!("failed to plot: {e}"));
            println!("{}", config.output.display());
        }
        Command::Templates { templates } => {
            for name in load_templates(templates).names() {
                println!("{name}");
            }
        }
    }
    Ok(())
}
