//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `datamapper_core` linkage from a standalone binary.
//! - Run one discovery-driven round trip with deterministic output.

use datamapper_core::{
    Capabilities, ConverterCatalog, Converter, DataMapper, DataObject, MappingError, MappingResult,
    RuleTable, StorageModel, StorageObject, TransferObject, ValidationRule,
};
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct ProbeDto {
    label: Option<String>,
}

impl DataObject for ProbeDto {
    fn capabilities(&self) -> Capabilities {
        Capabilities::TRANSFER
    }
}

impl TransferObject for ProbeDto {
    fn rule_table() -> RuleTable<Self> {
        RuleTable::<Self>::new().text(
            "label",
            |probe| probe.label.as_deref(),
            [ValidationRule::not_null(), ValidationRule::not_empty()],
        )
    }

    fn requires_validation() -> bool {
        true
    }
}

#[derive(Debug, Clone)]
struct ProbeRow {
    id: Uuid,
    label: String,
}

impl DataObject for ProbeRow {
    fn capabilities(&self) -> Capabilities {
        Capabilities::STORAGE
    }
}

impl StorageObject for ProbeRow {}

impl StorageModel for ProbeRow {
    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }
}

struct ProbeConverter;

impl Converter for ProbeConverter {
    type Transfer = ProbeDto;
    type Storage = ProbeRow;

    fn to_storage(&self, transfer: &ProbeDto) -> MappingResult<ProbeRow> {
        let mut row = ProbeRow {
            id: Uuid::nil(),
            label: transfer.label.clone().unwrap_or_default(),
        };
        row.assign_new_id();
        Ok(row)
    }

    fn to_transfer(&self, storage: &ProbeRow) -> MappingResult<ProbeDto> {
        Ok(ProbeDto {
            label: Some(storage.label.clone()),
        })
    }
}

fn round_trip() -> MappingResult<String> {
    let catalog = ConverterCatalog::new().with("cli.probe", |_| ProbeConverter)?;
    let mapper = DataMapper::new();
    mapper.register_from_discovery("cli", &catalog)?;

    let dto = ProbeDto {
        label: Some("ping".to_string()),
    };
    let Some(row) = mapper.map_to::<ProbeRow>(Some(&dto))? else {
        return Err(MappingError::conversion("round_trip", "storage side came back empty"));
    };
    let Some(back) = mapper.map_to::<ProbeDto>(Some(&row))? else {
        return Err(MappingError::conversion("round_trip", "transfer side came back empty"));
    };
    Ok(back.label.unwrap_or_default())
}

fn main() -> ExitCode {
    println!("datamapper_core version={}", datamapper_core::core_version());
    match round_trip() {
        Ok(label) => {
            println!("datamapper_core round_trip={label}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("datamapper_core round_trip failed: {err}");
            ExitCode::FAILURE
        }
    }
}
