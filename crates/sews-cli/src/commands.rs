use std::collections::BTreeSet;
use std::io::{self, IsTerminal};
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span, trace, warn};

use sews_cli::logging::redact_value;
use sews_core::{ItemLookup, build_corpus, normalize_long, prepare_training_data};
use sews_ingest::{read_corpus, read_external_dataset, write_corpus};
use sews_model::{FEATURES, FeatureGroup, PipelineOptions, feature_group};
use sews_predict::{
    DEFAULT_DECISION_THRESHOLD, Gender, LogisticTrainer, ModelHandle, RiskQuery, Trainer, assess,
    evaluate, save_model, summarize_external,
};

use crate::cli::{EtlArgs, GenderArg, PredictArgs, TrainArgs, ValidateExternalArgs};
use crate::summary::{apply_table_style, header_cell};
use crate::types::{EtlResult, ExternalResult, PredictResult, TrainResult};

pub fn run_features() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Feature"),
        header_cell("Group"),
    ]);
    apply_table_style(&mut table);
    for (index, name) in FEATURES.iter().enumerate() {
        let group = feature_group(index).map_or("-", FeatureGroup::as_str);
        table.add_row(vec![index.to_string(), (*name).to_string(), group.to_string()]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_etl(args: &EtlArgs, options: &PipelineOptions) -> Result<EtlResult> {
    let progress = patient_progress_bar();
    let outcome = build_corpus(&args.data_dir, options, &progress).context("build corpus")?;

    let write_start = Instant::now();
    write_corpus(&args.output, &outcome.corpus, options.horizon_hours)
        .context("write corpus")?;
    info!(
        output = %args.output.display(),
        row_count = outcome.corpus.len(),
        duration_ms = write_start.elapsed().as_millis(),
        "corpus written"
    );

    Ok(EtlResult {
        output: args.output.clone(),
        rows: outcome.corpus.len(),
        counts: outcome.corpus.class_counts(),
        prevalence: outcome.corpus.prevalence(),
        report: outcome.report,
    })
}

pub fn run_train(args: &TrainArgs, options: &PipelineOptions) -> Result<TrainResult> {
    let corpus = read_corpus(&args.corpus, options.horizon_hours).context("load corpus")?;
    info!(
        row_count = corpus.len(),
        patient_count = corpus.patients().len(),
        "corpus loaded"
    );

    let data = prepare_training_data(&corpus, options).context("prepare training data")?;

    let train_start = Instant::now();
    let trainer = LogisticTrainer::default().with_epochs(args.epochs);
    let model = info_span!("train", row_count = data.balanced.len())
        .in_scope(|| trainer.fit(&data.balanced))
        .context("fit classifier")?;
    info!(
        duration_ms = train_start.elapsed().as_millis(),
        "training complete"
    );

    let evaluation = info_span!("evaluate", row_count = data.holdout.len())
        .in_scope(|| evaluate(&model, &data.holdout, DEFAULT_DECISION_THRESHOLD));
    save_model(&args.model, &model).context("save model")?;

    let top_weights = model
        .top_weights(5)
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();
    Ok(TrainResult {
        model_path: args.model.clone(),
        corpus_rows: corpus.len(),
        corpus_prevalence: corpus.prevalence(),
        train_patients: data.split.train.len(),
        test_patients: data.split.test.len(),
        balance: data.balance,
        holdout_rows: data.holdout.len(),
        holdout_prevalence: data.holdout.prevalence(),
        evaluation,
        top_weights,
    })
}

pub fn run_validate_external(
    args: &ValidateExternalArgs,
    options: &PipelineOptions,
) -> Result<ExternalResult> {
    let handle = ModelHandle::load(&args.model).context("load model")?;
    let lookup = ItemLookup::default()
        .with_overrides(&options.item_map)
        .context("apply item map")?;

    let max_rows = (args.max_rows > 0).then_some(args.max_rows);
    let dataset =
        read_external_dataset(&args.dataset, max_rows).context("load external dataset")?;
    info!(
        source_rows = dataset.source_rows,
        skipped_rows = dataset.skipped_rows,
        "external dataset loaded"
    );

    let (table, diff) = normalize_long(&dataset.records, &lookup, options.sentinel);
    let patients: BTreeSet<&str> = table.keys.iter().map(|key| key.patient.as_str()).collect();
    let summary = summarize_external(
        &handle,
        &table.rows,
        &patients,
        options.external_alert_threshold,
    );
    if summary.looks_unmapped() {
        warn!(
            rows = summary.rows,
            "model output is zero for every row; check the feature mapping"
        );
    }

    Ok(ExternalResult {
        dataset: args.dataset.clone(),
        source_rows: dataset.source_rows,
        skipped_rows: dataset.skipped_rows,
        diff,
        summary,
    })
}

pub fn run_predict(args: &PredictArgs, options: &PipelineOptions) -> Result<PredictResult> {
    let handle = ModelHandle::load(&args.model).context("load model")?;
    let query = build_query(args).context("invalid patient values")?;
    let values = format!("{:?}", query.observation().values());
    trace!(values = redact_value(&values), "risk query");
    let assessment = assess(&handle, &query, options.sentinel, &options.risk);
    Ok(PredictResult {
        assessment,
        provided: query.observation().values().iter().flatten().count(),
    })
}

/// Builds the query from convenience flags first, then `--set` assignments,
/// so an assignment overrides a flag for the same feature.
fn build_query(args: &PredictArgs) -> sews_predict::Result<RiskQuery> {
    let mut query = RiskQuery::new();
    let measured = [
        ("HR", args.hr),
        ("Temp", args.temp),
        ("SBP", args.sbp),
        ("DBP", args.dbp),
        ("MAP", args.map),
        ("Resp", args.resp),
        ("O2Sat", args.o2sat),
        ("Age", args.age),
        ("ICULOS", args.icu_hours),
    ];
    for (name, value) in measured {
        if let Some(value) = value {
            query.set(name, value)?;
        }
    }
    let labs = [
        ("Lactate", args.lactate),
        ("WBC", args.wbc),
        ("Creatinine", args.creatinine),
    ];
    for (name, value) in labs {
        if let Some(value) = value {
            query.set_lab(name, value)?;
        }
    }
    if let Some(gender) = args.gender {
        query.set_gender(match gender {
            GenderArg::Male => Gender::Male,
            GenderArg::Female => Gender::Female,
        })?;
    }
    if let Some(hours) = args.hours_since_admission {
        query.set_hours_since_admission(hours)?;
    }
    for assignment in &args.assignments {
        query.assign(assignment)?;
    }
    Ok(query)
}

fn patient_progress_bar() -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} patients ({per_sec})",
    ) {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use sews_model::{SENTINEL, feature_index};

    use crate::cli::{Cli, Command};

    fn predict_args(argv: &[&str]) -> PredictArgs {
        let mut full = vec!["sews", "predict"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Predict(args) => args,
            _ => panic!("expected predict"),
        }
    }

    #[test]
    fn flags_map_onto_canonical_features() {
        let args = predict_args(&[
            "--hr",
            "110",
            "--gender",
            "female",
            "--hours-since-admission",
            "36",
            "--lactate",
            "0",
            "--wbc",
            "14.2",
        ]);
        let vector = build_query(&args).unwrap().to_vector(SENTINEL);
        assert_eq!(vector[feature_index("HR").unwrap()], 110.0);
        assert_eq!(vector[feature_index("Gender").unwrap()], 1.0);
        assert_eq!(vector[feature_index("HospAdmTime").unwrap()], -36.0);
        assert_eq!(vector[feature_index("Lactate").unwrap()], SENTINEL);
        assert_eq!(vector[feature_index("WBC").unwrap()], 14.2);
    }

    #[test]
    fn assignments_override_flags() {
        let args = predict_args(&["--hr", "90", "--set", "hr=150", "--set", "Platelets=95"]);
        let vector = build_query(&args).unwrap().to_vector(SENTINEL);
        assert_eq!(vector[feature_index("HR").unwrap()], 150.0);
        assert_eq!(vector[feature_index("Platelets").unwrap()], 95.0);
    }

    #[test]
    fn unknown_assignment_is_an_error() {
        let args = predict_args(&["--set", "Pulse=80"]);
        assert!(build_query(&args).is_err());
    }

    #[test]
    fn global_pipeline_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["sews", "train", "--seed", "7", "--shortfall", "fail"])
            .unwrap();
        assert_eq!(cli.pipeline.seed, Some(7));
        assert!(cli.pipeline.shortfall.is_some());
    }
}
