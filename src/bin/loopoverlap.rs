use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::info;
use loopoverlap::{
    cli::{Cli, Commands, DispatchArgs},
    io::{self as loop_io, cloops, juicer},
    jobs::{
        self,
        dispatch::{self, Dispatch},
    },
    overlap::{self, Cleanup},
    shuffle, utils,
};

fn main() -> Result<()> {
    // Initialize the logger. If the log level is not set via `RUST_LOG`, set it to 'info' by default
    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Cli::parse();
    match config.command {
        Commands::Convert {
            input,
            output_dir,
            significant,
        } => {
            cloops::convert_loop_file(&input, &output_dir, significant)?;
        }
        Commands::Prepare {
            samples,
            juicer_dir,
            sample_dir,
            output_dir,
        } => {
            let samples = samples.resolve()?;
            if let Some(juicer_dir) = juicer_dir {
                juicer::copy_sample_loops(&juicer_dir, &sample_dir, &samples)?;
            }
            let output_dir = output_dir.unwrap_or_else(|| sample_dir.clone());
            juicer::reformat_sample_loops(&sample_dir, &output_dir, &samples)?;
        }
        Commands::Jobs {
            samples,
            against,
            reference,
            overlap_type,
            sample_dir,
            overlap_dir,
            script_dir,
            shuffles,
            dispatch: dispatch_args,
            tools,
        } => {
            let samples = samples.resolve()?;
            let (queries, shuffled) = shuffles.queries(&samples, &sample_dir)?;
            let (overlap_jobs, label) = jobs::overlap_jobs(
                against,
                &queries,
                reference.as_deref(),
                overlap_type,
                &overlap_dir,
                shuffled,
            )?;

            let script = jobs::script_path(&script_dir, &label);
            let submission =
                dispatch::dispatch(&overlap_jobs, &script, &tools, dispatch_mode(&dispatch_args))?;
            if submission.awaits_scheduler() {
                info!(
                    "{} jobs in {} have not necessarily run yet",
                    submission.n_jobs,
                    submission.script.display()
                );
            }
        }
        Commands::Summarize {
            samples,
            reference,
            sample_dir,
            overlap_dir,
            shuffles,
            delete,
            output,
        } => {
            let samples = samples.resolve()?;
            let (queries, shuffled) = shuffles.queries(&samples, &sample_dir)?;
            let cleanup = match (delete, shuffled) {
                (false, _) => Cleanup::Keep,
                (true, false) => Cleanup::OverlapFiles,
                (true, true) => Cleanup::OverlapAndQueryFiles,
            };

            let reference_name = utils::name_from_path(&reference)?;
            let rows =
                overlap::summarize_queries(&queries, &reference_name, &overlap_dir, cleanup)?;
            loop_io::write_summaries(&rows, output.as_deref())?;
        }
        Commands::Matrix {
            samples,
            sample_dir,
            overlap_dir,
            delete,
            counts_output,
            percent_output,
        } => {
            let samples = samples.resolve()?;
            let matrices =
                overlap::between_sample_matrices(&samples, &sample_dir, &overlap_dir, delete)?;
            loop_io::write_matrix(&matrices.samples, &matrices.counts, Some(&counts_output))?;
            loop_io::write_matrix(&matrices.samples, &matrices.percents, Some(&percent_output))?;
        }
        Commands::Shuffle {
            samples,
            n,
            sample_dir,
            shuffle_dir,
            genome,
            tools,
        } => {
            let samples = samples.resolve()?;
            shuffle::shuffle_samples(&samples, n, &sample_dir, &shuffle_dir, &genome, &tools)?;
        }
    }

    Ok(())
}

fn dispatch_mode(args: &DispatchArgs) -> Dispatch {
    if args.local {
        Dispatch::Local
    } else if args.no_submit {
        Dispatch::ScriptOnly
    } else {
        Dispatch::Swarm
    }
}
