use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::time::Instant;

use fwrank::errors::LearnerError;
use fwrank::learner::{Learner, LearnerTrait};
use fwrank::metrics::ProgressiveMetric;
use fwrank::model_instance::ModelInstance;
use fwrank::persistence::{new_learner_from_filename, save_learner_to_filename};
use fwrank::record_reader::{create_buffered_input, read_group_sizes_from_filename, GroupReader};
use fwrank::{cmdline, logging_layer};

fn main() {
    logging_layer::initialize_logging_layer();

    if let Err(e) = main_fw_loop() {
        log::error!("Global error: {}", e);
        std::process::exit(1)
    }
}

#[derive(Debug, Default, PartialEq)]
struct PassStats {
    groups: u64,
    records: u64,
    skipped_groups: u64,
}

// Bad groups are dropped with a warning, anything else stops the run
fn skip_or_fail(e: LearnerError, group_id: usize) -> Result<(), Box<dyn Error>> {
    if e.is_recoverable() {
        log::warn!("Skipping group {}: {}", group_id, e);
        Ok(())
    } else {
        Err(Box::new(e))
    }
}

/// Progressive validation: every group is scored before the learner sees its labels.
fn run_pass(
    learner: &mut Learner,
    reader: &mut GroupReader,
    testonly: bool,
    mut predictions_out: Option<&mut dyn Write>,
    pass: usize,
) -> Result<PassStats, Box<dyn Error>> {
    let mut stats = PassStats::default();
    let mut metric = ProgressiveMetric::new(learner.model_instance().loss);

    while let Some(group) = reader.next_group()? {
        stats.records += group.rows.len() as u64;
        let predictions = match learner.predict(&group.rows, None) {
            Ok(p) => p,
            Err(e) => {
                skip_or_fail(e, group.group_id)?;
                stats.skipped_groups += 1;
                continue;
            }
        };

        if let Some(out) = predictions_out.as_mut() {
            for p in &predictions {
                writeln!(out, "{:.6}", p)?;
            }
        }

        if !testonly {
            if let Err(e) = learner.update(&group.rows, &predictions, &group.labels) {
                skip_or_fail(e, group.group_id)?;
                stats.skipped_groups += 1;
                continue;
            }
        }

        metric.add_group(&predictions, &group.labels);
        stats.groups += 1;
        if stats.groups.is_power_of_two() {
            log::info!(
                "pass {} groups {} records {} {} {:.6}",
                pass,
                stats.groups,
                stats.records,
                metric.name(),
                metric.mean()
            );
        }
    }

    log::info!(
        "Finished pass {}: groups {} records {} skipped groups {} {} {:.6}",
        pass,
        stats.groups,
        stats.records,
        stats.skipped_groups,
        metric.name(),
        metric.mean()
    );
    Ok(stats)
}

fn main_fw_loop() -> Result<(), Box<dyn Error>> {
    // We'll parse once the command line into cl and then different objects will examine it
    let cl = cmdline::parse(std::env::args_os());

    let input_filename = cl.value_of("data").ok_or("--data expected")?;
    let testonly = cl.is_present("testonly");
    let passes: usize = match cl.value_of("passes") {
        Some(passes) => passes.parse()?,
        None => 1,
    };
    if passes == 0 {
        return Err("--passes has to be at least 1")?;
    }

    let final_regressor_filename = cl.value_of("final_regressor");
    if let Some(filename) = final_regressor_filename {
        log::info!("final_regressor = {}", filename);
    };

    // Where will we be putting predictions (if at all)
    let mut predictions_file = match cl.value_of("predictions") {
        Some(filename) => Some(BufWriter::new(File::create(filename)?)),
        None => None,
    };

    let mut learner = if let Some(filename) = cl.value_of("initial_regressor") {
        log::info!("initial_regressor = {}", filename);
        log::warn!("Model parameters are taken from {}, command line model parameters are ignored", filename);
        new_learner_from_filename(filename)?
    } else {
        let mi = ModelInstance::new_from_cmdline(&cl)?;
        Learner::new(&mi)
    };

    let group_sizes = match cl.value_of("groups") {
        Some(filename) => Some(read_group_sizes_from_filename(filename)?),
        None => None,
    };

    let now = Instant::now();
    let mut total = PassStats::default();
    for pass in 0..passes {
        let input = create_buffered_input(input_filename)?;
        let mut reader = GroupReader::new(input, group_sizes.clone());
        let out = predictions_file.as_mut().map(|f| f as &mut dyn Write);
        let stats = run_pass(&mut learner, &mut reader, testonly, out, pass)?;
        total.groups += stats.groups;
        total.records += stats.records;
        total.skipped_groups += stats.skipped_groups;
    }
    if let Some(file) = predictions_file.as_mut() {
        file.flush()?;
    }

    let elapsed = now.elapsed();
    log::info!(
        "Elapsed: {:.2?} groups: {} records: {} skipped groups: {}",
        elapsed,
        total.groups,
        total.records,
        total.skipped_groups
    );

    if let Some(filename) = final_regressor_filename {
        save_learner_to_filename(filename, &learner)?;
    }
    Ok(())
}
