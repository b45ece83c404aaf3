use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::table::{normalize_header, Table, TableError};

/// One business column a domain's store persists.
///
/// `header` is the canonical spreadsheet header, `ident` the SQL column name,
/// and `aliases` the normalized header variants accepted at upload time
/// (spreadsheets from different zones spell several headers differently).
///
/// An `optional` column never fails validation; its value is consolidated
/// from every upload header containing all of `keywords`, joined with
/// `" | "`, and stays empty when no such header exists.
#[derive(Clone, Copy, Debug)]
pub struct DomainColumn {
    pub header: &'static str,
    pub ident: &'static str,
    pub aliases: &'static [&'static str],
    pub keywords: &'static [&'static str],
    pub optional: bool,
}

const fn col(
    header: &'static str,
    ident: &'static str,
    aliases: &'static [&'static str],
) -> DomainColumn {
    DomainColumn {
        header,
        ident,
        aliases,
        keywords: &[],
        optional: false,
    }
}

const fn consolidated(
    header: &'static str,
    ident: &'static str,
    aliases: &'static [&'static str],
    keywords: &'static [&'static str],
) -> DomainColumn {
    DomainColumn {
        header,
        ident,
        aliases,
        keywords,
        optional: true,
    }
}

const CONTROL_STATUS_COLUMNS: &[DomainColumn] = &[
    col("IT Solution", "it_solution", &["it solutions"]),
    col("MICS ID", "mics_id", &["micsid", "mics"]),
    col("BU Country/Owner", "bu_country_owner", &["bu country", "bu owner"]),
    col("Zone", "zone", &[]),
    col("Control Owner", "control_owner", &["owner"]),
    col("Control Tester", "control_tester", &["tester"]),
    col("Control Reviewer", "control_reviewer", &["reviewer"]),
    col(
        "Control Executor",
        "control_executor",
        &[
            "control executer",
            "executor",
            "controlexecutor (zcm lookup) (mics_zonalcontrolmaster)",
        ],
    ),
    col("Control Status", "control_status", &["status"]),
    col("Test Conclusion (OE1)", "test_conclusion_oe1", &["test conclusion oe1", "test conclusion - oe1"]),
    col("Test Conclusion (OE2)", "test_conclusion_oe2", &["test conclusion oe2", "test conclusion - oe2"]),
    col("Test Conclusion (YE)", "test_conclusion_ye", &["test conclusion ye", "test conclusion - ye"]),
    // Zones report failure details under many headers (`Failure Reason
    // (OE1)`, `Root_Cause_YE`, ...); these two gather every variant.
    consolidated("Fail Reason", "fail_reason", &["fail reason"], &["failure", "reason"]),
    consolidated("Root Cause", "root_cause", &["root cause"], &["root", "cause"]),
];

const MICS_TICKETS_COLUMNS: &[DomainColumn] = &[
    col("Ticket ID", "ticket_id", &["ticket", "ticket number"]),
    col("IT Solution", "it_solution", &["it solutions"]),
    col("MICS ID", "mics_id", &["micsid", "mics"]),
    col("Priority", "priority", &[]),
    col("Status", "status", &["ticket status"]),
    col("Assignee", "assignee", &["assigned to"]),
    col("Opened", "opened", &["opened date", "created"]),
    col("Closed", "closed", &["closed date", "resolved"]),
];

const MICS_EFFORT_COLUMNS: &[DomainColumn] = &[
    col("MICS ID", "mics_id", &["micsid", "mics"]),
    col("IT Solution", "it_solution", &["it solutions"]),
    col("Activity", "activity", &[]),
    col("Owner", "owner", &["activity owner"]),
    col("Planned Days", "planned_days", &["planned effort"]),
    col("Actual Days", "actual_days", &["actual effort"]),
    col("Period", "period", &["reporting period"]),
];

const MICS_SA_COLUMNS: &[DomainColumn] = &[
    col("Agreement ID", "agreement_id", &["sa id", "agreement"]),
    col("IT Solution", "it_solution", &["it solutions"]),
    col("Provider", "provider", &["service provider"]),
    col("Service", "service", &["service name"]),
    col("Status", "status", &["agreement status"]),
    col("Valid From", "valid_from", &["start date"]),
    col("Valid To", "valid_to", &["end date"]),
];

/// One of the four fixed reporting domains, each backed by its own SQLite
/// file and table. The set is closed: stores are mutually isolated and every
/// persistence call targets exactly one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    ControlStatus,
    MicsTickets,
    MicsEffort,
    MicsSa,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::ControlStatus,
        Domain::MicsTickets,
        Domain::MicsEffort,
        Domain::MicsSa,
    ];

    /// Human-readable tab label, matching the original dashboard UI.
    pub fn label(self) -> &'static str {
        match self {
            Domain::ControlStatus => "Control Status",
            Domain::MicsTickets => "Mics Tickets",
            Domain::MicsEffort => "Mics Effort",
            Domain::MicsSa => "Mics SA",
        }
    }

    /// Stable kebab-case name used on the command line and in env overrides.
    pub fn slug(self) -> &'static str {
        match self {
            Domain::ControlStatus => "control-status",
            Domain::MicsTickets => "mics-tickets",
            Domain::MicsEffort => "mics-effort",
            Domain::MicsSa => "mics-sa",
        }
    }

    /// Default SQLite file name under the configured data directory.
    pub fn db_file_name(self) -> &'static str {
        match self {
            Domain::ControlStatus => "control_status.db",
            Domain::MicsTickets => "mics_tickets.db",
            Domain::MicsEffort => "mics_effort.db",
            Domain::MicsSa => "mics_sa.db",
        }
    }

    pub fn table_name(self) -> &'static str {
        match self {
            Domain::ControlStatus => "controls",
            Domain::MicsTickets => "mics_tickets",
            Domain::MicsEffort => "mics_effort",
            Domain::MicsSa => "mics_sa",
        }
    }

    /// Declared business columns, in storage order.
    pub fn columns(self) -> &'static [DomainColumn] {
        match self {
            Domain::ControlStatus => CONTROL_STATUS_COLUMNS,
            Domain::MicsTickets => MICS_TICKETS_COLUMNS,
            Domain::MicsEffort => MICS_EFFORT_COLUMNS,
            Domain::MicsSa => MICS_SA_COLUMNS,
        }
    }

    /// Project an uploaded table onto this domain's declared column set.
    ///
    /// Headers are matched case/whitespace-insensitively, then against each
    /// column's known aliases. A required column with no match fails with
    /// [`TableError::MissingColumn`]; an optional column consolidates every
    /// keyword-matched header (empty when none exist). Columns the domain
    /// does not declare are dropped.
    pub fn conform(self, table: &Table) -> Result<Table, TableError> {
        enum Projection {
            Single(usize),
            Consolidated(Vec<usize>),
        }

        let mut plan = Vec::with_capacity(self.columns().len());
        for column in self.columns() {
            if column.optional {
                plan.push(Projection::Consolidated(matching_headers(table, column)));
                continue;
            }
            let idx = table
                .column_index(column.header)
                .or_else(|| {
                    column.aliases.iter().find_map(|alias| {
                        table
                            .columns()
                            .iter()
                            .position(|c| normalize_header(c) == *alias)
                    })
                })
                .ok_or_else(|| TableError::MissingColumn(column.header.to_string()))?;
            plan.push(Projection::Single(idx));
        }

        let mut out = Table::new(
            self.columns()
                .iter()
                .map(|c| c.header.to_string())
                .collect(),
        );
        for row in table.rows() {
            let projected = plan
                .iter()
                .map(|projection| match projection {
                    Projection::Single(i) => row[*i].clone(),
                    Projection::Consolidated(sources) => consolidate(row, sources),
                })
                .collect();
            out.push_row(projected)?;
        }
        Ok(out)
    }
}

/// Upload headers feeding one consolidated column: the canonical header, any
/// alias, or any header containing all of the column's keywords.
fn matching_headers(table: &Table, column: &DomainColumn) -> Vec<usize> {
    let canonical = normalize_header(column.header);
    table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            let normalized = normalize_header(c);
            normalized == canonical
                || column.aliases.contains(&normalized.as_str())
                || (!column.keywords.is_empty()
                    && column.keywords.iter().all(|k| normalized.contains(k)))
        })
        .map(|(i, _)| i)
        .collect()
}

fn consolidate(row: &[crate::CellScalar], sources: &[usize]) -> crate::CellScalar {
    let values: Vec<String> = sources
        .iter()
        .map(|&i| row[i].display_text())
        .filter(|v| !v.trim().is_empty())
        .collect();
    if values.is_empty() {
        crate::CellScalar::Empty
    } else {
        crate::CellScalar::Text(values.join(" | "))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_header(s);
        Domain::ALL
            .into_iter()
            .find(|d| d.slug() == wanted || normalize_header(d.label()) == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown store '{s}' (expected one of: {})",
                    Domain::ALL.map(|d| d.slug()).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellScalar;
    use pretty_assertions::assert_eq;

    #[test]
    fn idents_are_unique_per_domain() {
        for domain in Domain::ALL {
            let mut idents: Vec<_> = domain.columns().iter().map(|c| c.ident).collect();
            idents.sort_unstable();
            idents.dedup();
            assert_eq!(idents.len(), domain.columns().len(), "{domain}");
        }
    }

    #[test]
    fn from_str_accepts_slug_and_label() {
        assert_eq!("mics-tickets".parse::<Domain>().unwrap(), Domain::MicsTickets);
        assert_eq!("Control Status".parse::<Domain>().unwrap(), Domain::ControlStatus);
        assert!("payroll".parse::<Domain>().is_err());
    }

    #[test]
    fn conform_reorders_and_drops_extras() {
        let mut uploaded = Table::new(vec![
            "Period".into(),
            "Comment".into(),
            "micsid".into(),
            "it solutions".into(),
            "Activity".into(),
            "activity owner".into(),
            "Planned Effort".into(),
            "Actual Days".into(),
        ]);
        uploaded
            .push_row(vec![
                "2026-Q1".into(),
                "ignore me".into(),
                "M-7".into(),
                "SAP".into(),
                "Testing".into(),
                "A. Silva".into(),
                CellScalar::Number(5.0),
                CellScalar::Number(4.0),
            ])
            .unwrap();

        let conformed = Domain::MicsEffort.conform(&uploaded).unwrap();
        let headers: Vec<_> = conformed.columns().to_vec();
        assert_eq!(
            headers,
            vec![
                "MICS ID",
                "IT Solution",
                "Activity",
                "Owner",
                "Planned Days",
                "Actual Days",
                "Period"
            ]
        );
        assert_eq!(conformed.rows()[0][0], CellScalar::Text("M-7".into()));
        assert_eq!(conformed.rows()[0][6], CellScalar::Text("2026-Q1".into()));
    }

    fn control_status_required_headers() -> Vec<String> {
        Domain::ControlStatus
            .columns()
            .iter()
            .filter(|c| !c.optional)
            .map(|c| c.header.to_string())
            .collect()
    }

    fn control_status_required_row() -> Vec<CellScalar> {
        vec![
            "SAP".into(),
            "M-1".into(),
            "Brazil".into(),
            "LATAM".into(),
            "A. Silva".into(),
            "R. Costa".into(),
            "P. Mendes".into(),
            "A. Silva".into(),
            "Ineffective".into(),
            "Fail".into(),
            "Pass".into(),
            "Fail".into(),
        ]
    }

    #[test]
    fn control_status_consolidates_fail_reason_and_root_cause_variants() {
        let mut headers = control_status_required_headers();
        headers.push("Failure Reason (OE1)".into());
        headers.push("failure_reason_YE".into());
        headers.push("Root_Cause_YE".into());

        let mut uploaded = Table::new(headers);
        let mut row = control_status_required_row();
        row.push("late evidence".into());
        row.push("missing approval".into());
        row.push("staff turnover".into());
        uploaded.push_row(row).unwrap();

        let conformed = Domain::ControlStatus.conform(&uploaded).unwrap();
        let fail_reason = conformed.column_index("Fail Reason").unwrap();
        let root_cause = conformed.column_index("Root Cause").unwrap();
        assert_eq!(
            conformed.rows()[0][fail_reason],
            CellScalar::Text("late evidence | missing approval".into())
        );
        assert_eq!(
            conformed.rows()[0][root_cause],
            CellScalar::Text("staff turnover".into())
        );
    }

    #[test]
    fn consolidated_columns_stay_empty_when_no_variant_is_uploaded() {
        let mut uploaded = Table::new(control_status_required_headers());
        uploaded.push_row(control_status_required_row()).unwrap();

        let conformed = Domain::ControlStatus.conform(&uploaded).unwrap();
        let fail_reason = conformed.column_index("Fail Reason").unwrap();
        let root_cause = conformed.column_index("Root Cause").unwrap();
        assert_eq!(conformed.rows()[0][fail_reason], CellScalar::Empty);
        assert_eq!(conformed.rows()[0][root_cause], CellScalar::Empty);
    }

    #[test]
    fn conform_reports_the_missing_header() {
        let uploaded = Table::new(vec!["MICS ID".into()]);
        let err = Domain::MicsSa.conform(&uploaded).unwrap_err();
        assert!(matches!(err, TableError::MissingColumn(ref h) if h == "Agreement ID"));
    }
}
