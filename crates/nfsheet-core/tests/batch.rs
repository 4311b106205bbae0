//! End-to-end batch runs over fixture directories.

use std::fs;
use std::path::Path;

use nfsheet_core::{
    BatchDriver, GoodsInvoice, NfsheetConfig, NfsheetError, OutputFormat, ServiceInvoice,
    TabulationError, TabulationMode, Targets,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const DANFE: &str = include_str!("fixtures/nfe_danfe.xml");
const NFSE_CNPJ: &str = include_str!("fixtures/nfse_cnpj.xml");
const NFSE_CPF: &str = include_str!("fixtures/nfse_cpf.xml");
const CTE: &str = include_str!("fixtures/cte_unsupported.xml");

struct Workspace {
    _dir: TempDir,
    config: NfsheetConfig,
}

impl Workspace {
    fn new(files: &[(&str, &str)], format: OutputFormat) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("Notas Fiscais");
        fs::create_dir(&input).unwrap();
        for (name, content) in files {
            fs::write(input.join(name), content).unwrap();
        }

        let mut config = NfsheetConfig::default();
        config.input.directory = input;
        config.output.directory = dir.path().join("out");
        config.output.format = format;

        Self { _dir: dir, config }
    }

    fn out(&self) -> &Path {
        &self.config.output.directory
    }

    fn output_names(&self) -> Vec<String> {
        let mut names: Vec<String> = match fs::read_dir(self.out()) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    fn read_csv(&self, name: &str) -> Vec<Vec<String>> {
        let mut reader = csv::Reader::from_path(self.out().join(name)).unwrap();
        let mut rows = vec![
            reader
                .headers()
                .unwrap()
                .iter()
                .map(str::to_string)
                .collect::<Vec<_>>(),
        ];
        for record in reader.records() {
            rows.push(record.unwrap().iter().map(str::to_string).collect());
        }
        rows
    }
}

#[test]
fn separate_mode_writes_one_file_per_document() {
    let ws = Workspace::new(
        &[("A_DANFE.xml", DANFE), ("B.xml", NFSE_CNPJ)],
        OutputFormat::Xlsx,
    );

    let report = BatchDriver::new(&ws.config)
        .run(&Targets::Directory, TabulationMode::Separate)
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(
        ws.output_names(),
        vec!["NF_A_DANFE.xml.xlsx", "NF_B.xml.xlsx"]
    );
}

#[test]
fn separate_mode_columns_match_schema() {
    let ws = Workspace::new(
        &[("A_DANFE.xml", DANFE), ("B.xml", NFSE_CNPJ)],
        OutputFormat::Csv,
    );

    BatchDriver::new(&ws.config)
        .run(&Targets::Directory, TabulationMode::Separate)
        .unwrap();

    let goods = ws.read_csv("NF_A_DANFE.xml.csv");
    let service = ws.read_csv("NF_B.xml.csv");
    assert_eq!(goods[0], GoodsInvoice::COLUMNS.to_vec());
    assert_eq!(service[0], ServiceInvoice::COLUMNS.to_vec());
    assert!(goods[0].iter().all(|c| !service[0].contains(c)));
    assert_eq!(goods.len(), 2);
    assert_eq!(
        goods[1].last().unwrap(),
        "Caderno 200 folhas: 45.90; Caneta azul: 4.50; Caderno 200 folhas: 45.90; Mochila escolar: 34.50"
    );
}

#[test]
fn separate_mode_is_idempotent() {
    let ws = Workspace::new(&[("A_DANFE.xml", DANFE)], OutputFormat::Csv);
    let driver = BatchDriver::new(&ws.config);

    driver.run(&Targets::Directory, TabulationMode::Separate).unwrap();
    let first = fs::read(ws.out().join("NF_A_DANFE.xml.csv")).unwrap();
    driver.run(&Targets::Directory, TabulationMode::Separate).unwrap();
    let second = fs::read(ws.out().join("NF_A_DANFE.xml.csv")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn failures_are_isolated_per_file() {
    let broken = DANFE.replace("<CPF>12345678909</CPF>", "");
    let ws = Workspace::new(
        &[
            ("a.xml", DANFE),
            ("b.xml", broken.as_str()),
            ("c.xml", CTE),
            ("d.xml", "<not-closed>"),
            ("e.xml", NFSE_CPF),
        ],
        OutputFormat::Csv,
    );

    let report = BatchDriver::new(&ws.config)
        .run(&Targets::Directory, TabulationMode::Separate)
        .unwrap();

    assert!(!report.is_success());
    let failed: Vec<&str> = report.failed().map(|o| o.file.as_str()).collect();
    assert_eq!(failed, vec!["b.xml", "c.xml", "d.xml"]);
    assert!(
        report.outcomes[1]
            .error
            .as_deref()
            .unwrap()
            .contains("nfeProc/NFe/infNFe/dest/CPF")
    );
    assert!(
        report.outcomes[2]
            .error
            .as_deref()
            .unwrap()
            .contains("unsupported schema (root element: cteProc)")
    );
    assert_eq!(ws.output_names(), vec!["NF_a.xml.csv", "NF_e.xml.csv"]);
}

#[test]
fn fail_fast_stops_at_first_failure() {
    let ws = Workspace::new(
        &[("a.xml", CTE), ("b.xml", DANFE)],
        OutputFormat::Csv,
    );

    let report = BatchDriver::new(&ws.config)
        .with_fail_fast(true)
        .run(&Targets::Directory, TabulationMode::Separate)
        .unwrap();

    assert!(report.stopped_early);
    assert_eq!(report.outcomes.len(), 1);
    assert!(ws.output_names().is_empty());
}

#[test]
fn explicit_targets_keep_given_order() {
    let ws = Workspace::new(
        &[("a.xml", NFSE_CNPJ), ("b.xml", NFSE_CPF), ("skip.xml", CTE)],
        OutputFormat::Csv,
    );

    let report = BatchDriver::new(&ws.config)
        .run(
            &Targets::Files(vec!["b.xml".into(), "a.xml".into()]),
            TabulationMode::Combined,
        )
        .unwrap();

    assert!(report.is_success());
    let rows = ws.read_csv("NF.csv");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], "2023000000000158");
    assert_eq!(rows[2][0], "2023000000000157");
}

#[test]
fn combined_mode_writes_rows_in_processing_order() {
    let second = DANFE
        .replace("<vNF>139.30</vNF>", "<vNF>99.99</vNF>")
        .replace("<email>maria@example.com</email>", "<email></email>");
    let ws = Workspace::new(
        &[("1_DANFE.xml", DANFE), ("2_DANFE.xml", second.as_str())],
        OutputFormat::Csv,
    );

    let report = BatchDriver::new(&ws.config)
        .run(&Targets::Directory, TabulationMode::Combined)
        .unwrap();

    assert!(report.is_success());
    assert_eq!(ws.output_names(), vec!["NF.csv"]);
    assert_eq!(report.outputs().len(), 1);

    let rows = ws.read_csv("NF.csv");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], GoodsInvoice::COLUMNS.to_vec());
    let total = rows[0].iter().position(|c| c == "valor_total").unwrap();
    let email = rows[0].iter().position(|c| c == "email_comprador").unwrap();
    assert_eq!(rows[1][total], "139.30");
    assert_eq!(rows[2][total], "99.99");
    assert_eq!(rows[2][email], "N/A");
}

#[test]
fn combined_mode_rejects_mixed_schemas_before_writing() {
    let ws = Workspace::new(
        &[("a.xml", DANFE), ("b.xml", NFSE_CNPJ)],
        OutputFormat::Csv,
    );

    let err = BatchDriver::new(&ws.config)
        .run(&Targets::Directory, TabulationMode::Combined)
        .unwrap_err();

    assert!(matches!(
        err,
        NfsheetError::Tabulation(TabulationError::MixedSchema { ref file, .. }) if file == "b.xml"
    ));
    assert!(ws.output_names().is_empty());
}

#[test]
fn combined_mode_flags_failed_files() {
    let ws = Workspace::new(
        &[("a.xml", DANFE), ("b.xml", CTE)],
        OutputFormat::Csv,
    );

    let report = BatchDriver::new(&ws.config)
        .run(&Targets::Directory, TabulationMode::Combined)
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed().count(), 1);
    assert_eq!(ws.read_csv("NF.csv").len(), 2);
}

#[test]
fn combined_mode_fail_fast_writes_nothing() {
    let ws = Workspace::new(
        &[("a.xml", DANFE), ("b.xml", CTE)],
        OutputFormat::Csv,
    );

    let report = BatchDriver::new(&ws.config)
        .with_fail_fast(true)
        .run(&Targets::Directory, TabulationMode::Combined)
        .unwrap();

    assert!(report.stopped_early);
    assert!(report.combined_output.is_none());
    assert!(ws.output_names().is_empty());
}

#[test]
fn missing_input_directory_is_an_error() {
    let mut config = NfsheetConfig::default();
    config.input.directory = "/definitely/not/here".into();

    let err = BatchDriver::new(&config)
        .run(&Targets::Directory, TabulationMode::Separate)
        .unwrap_err();
    assert!(matches!(err, NfsheetError::Config(_)));
}

#[test]
fn target_in_subfolder_is_written_by_file_name() {
    let ws = Workspace::new(&[], OutputFormat::Csv);
    let nested = ws.config.input.directory.join("2023");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("a.xml"), DANFE).unwrap();

    let report = BatchDriver::new(&ws.config)
        .run(
            &Targets::Files(vec!["2023/a.xml".into()]),
            TabulationMode::Separate,
        )
        .unwrap();

    assert!(report.is_success(), "{:?}", report.outcomes[0].error);
    assert_eq!(ws.output_names(), vec!["NF_a.xml.csv"]);
}

#[test]
fn latin1_documents_are_decoded() {
    let ws = Workspace::new(&[], OutputFormat::Csv);
    fs::write(
        ws.config.input.directory.join("latin1.xml"),
        include_bytes!("fixtures/nfse_latin1.xml"),
    )
    .unwrap();

    let report = BatchDriver::new(&ws.config)
        .run(&Targets::Directory, TabulationMode::Separate)
        .unwrap();

    assert!(report.is_success(), "{:?}", report.outcomes[0].error);
    let rows = ws.read_csv("NF_latin1.xml.csv");
    let name = rows[0].iter().position(|c| c == "nome_tomador").unwrap();
    let address = rows[0].iter().position(|c| c == "endereco_tomador").unwrap();
    assert_eq!(rows[1][name], "João Pereira");
    assert_eq!(rows[1][address], "Av. Paulista 900 - Consolação, SP");
}

#[test]
fn rewrite_each_record_updates_combined_file_during_run() {
    let ws = Workspace::new(
        &[("1.xml", NFSE_CNPJ), ("2.xml", NFSE_CPF)],
        OutputFormat::Csv,
    );
    let combined = ws.out().join("NF.csv");

    let mut rows_seen = Vec::new();
    let report = BatchDriver::new(&ws.config)
        .with_rewrite_each_record(true)
        .run_with(&Targets::Directory, TabulationMode::Combined, |outcome| {
            assert_eq!(outcome.output.as_deref(), Some(combined.as_path()));
            rows_seen.push(fs::read_to_string(&combined).unwrap().lines().count());
        })
        .unwrap();

    assert!(report.is_success());
    assert_eq!(rows_seen, vec![2, 3]);
    assert_eq!(report.combined_output.as_deref(), Some(combined.as_path()));
}

#[test]
fn terminal_combined_write_happens_after_last_record() {
    let ws = Workspace::new(
        &[("1.xml", NFSE_CNPJ), ("2.xml", NFSE_CPF)],
        OutputFormat::Csv,
    );
    let combined = ws.out().join("NF.csv");

    let mut existed = Vec::new();
    BatchDriver::new(&ws.config)
        .run_with(&Targets::Directory, TabulationMode::Combined, |_| {
            existed.push(combined.exists());
        })
        .unwrap();

    assert_eq!(existed, vec![false, false]);
    assert_eq!(ws.read_csv("NF.csv").len(), 3);
}

#[test]
fn rewrite_each_record_keeps_rows_written_before_mixed_schema() {
    let ws = Workspace::new(
        &[("a.xml", NFSE_CNPJ), ("b.xml", DANFE)],
        OutputFormat::Csv,
    );

    let err = BatchDriver::new(&ws.config)
        .with_rewrite_each_record(true)
        .run(&Targets::Directory, TabulationMode::Combined)
        .unwrap_err();

    assert!(matches!(
        err,
        NfsheetError::Tabulation(TabulationError::MixedSchema { .. })
    ));
    assert_eq!(ws.read_csv("NF.csv").len(), 2);
}
