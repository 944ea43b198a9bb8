//! Declarative table of scrape-time node gauges.

/// How a field is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Numeric gauge. Booleans map to `1`/`0`.
    Value,
    /// Gauge with a single label carrying the field's string value.
    Label(&'static str),
}

/// One `{RPC method, field, metric}` mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    /// Argument-less JSON-RPC method to call.
    pub method: &'static str,
    /// JSON pointer into the method's `result`; `""` is the whole result.
    pub pointer: &'static str,
    /// Metric name, without the registry's `solana_` prefix.
    pub name: &'static str,
    pub help: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn value(
        method: &'static str,
        pointer: &'static str,
        name: &'static str,
        help: &'static str,
    ) -> Self {
        Self {
            method,
            pointer,
            name,
            help,
            kind: FieldKind::Value,
        }
    }

    pub const fn label(
        method: &'static str,
        pointer: &'static str,
        name: &'static str,
        help: &'static str,
        label: &'static str,
    ) -> Self {
        Self {
            method,
            pointer,
            name,
            help,
            kind: FieldKind::Label(label),
        }
    }
}

const DEFAULT_FIELDS: &[FieldSpec] = &[
    FieldSpec::label(
        "getHealth",
        "",
        "node_health",
        "The current health of the node",
        "status",
    ),
    FieldSpec::label(
        "getVersion",
        "/solana-core",
        "core_version",
        "Software version of solana-core",
        "solana_core",
    ),
    FieldSpec::value(
        "getEpochSchedule",
        "/slotsPerEpoch",
        "slots_per_epoch",
        "The maximum number of slots in each epoch",
    ),
    FieldSpec::value(
        "getEpochSchedule",
        "/leaderScheduleSlotOffset",
        "leader_schedule_slot_offset",
        "The number of slots before beginning of an epoch to calculate a leader schedule for that epoch",
    ),
    FieldSpec::value(
        "getEpochSchedule",
        "/firstNormalEpoch",
        "first_normal_epoch",
        "First normal-length epoch, log2(slotsPerEpoch) - log2(MINIMUM_SLOTS_PER_EPOCH)",
    ),
    FieldSpec::value(
        "getEpochSchedule",
        "/firstNormalSlot",
        "first_normal_slot",
        "MINIMUM_SLOTS_PER_EPOCH * (2.pow(firstNormalEpoch) - 1)",
    ),
    FieldSpec::value(
        "getEpochSchedule",
        "/warmup",
        "epoch_schedule_warmup",
        "Whether epochs start short and grow (1 = warmup)",
    ),
    FieldSpec::value(
        "getSlot",
        "",
        "current_slot",
        "The current slot the node is processing",
    ),
    FieldSpec::label(
        "getSlotLeader",
        "",
        "slot_leader",
        "The current slot leader",
        "leader",
    ),
    FieldSpec::value(
        "getFirstAvailableBlock",
        "",
        "first_available_block",
        "The slot of the lowest confirmed block that has not been purged from the ledger",
    ),
    FieldSpec::value(
        "getMaxRetransmitSlot",
        "",
        "max_retransmit_slot",
        "The max slot seen from retransmit stage",
    ),
    FieldSpec::value(
        "getMinimumLedgerSlot",
        "",
        "minimum_ledger_slot",
        "The lowest slot that the node has information about in its ledger",
    ),
    FieldSpec::value(
        "getTransactionCount",
        "",
        "transaction_count",
        "The current Transaction count from the ledger",
    ),
];

/// The node gauges served on every scrape.
pub fn default_fields() -> Vec<FieldSpec> {
    DEFAULT_FIELDS.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_metric_names_are_unique() {
        let fields = default_fields();
        let names: HashSet<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names.len(), fields.len());
    }

    #[test]
    fn pointers_are_root_or_absolute() {
        for field in default_fields() {
            assert!(
                field.pointer.is_empty() || field.pointer.starts_with('/'),
                "bad pointer for {}: {:?}",
                field.name,
                field.pointer
            );
        }
    }
}
