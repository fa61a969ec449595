//! Statement extraction from a single filing.
//!
//! Facts are joined to their tag definitions, restricted to the US-GAAP
//! taxonomy and split into the three statements by a fixed tag vocabulary.
//! Each statement keeps one row per tag.

use crate::dataset::Dataset;
use polars::prelude::*;
use statements_core::statement::columns;
use statements_core::types::parse_sec_date;
use statements_core::{Fact, Filing, Result, StatementExtract, StatementType};
use std::cmp::{Ordering, Reverse};
use std::collections::HashSet;
use tracing::{debug, instrument};

/// Substring identifying standard US-GAAP taxonomy versions.
pub const GAAP_MARKER: &str = "us-gaap";

/// Balance sheet line items (instants).
pub const BALANCE_SHEET_TAGS: &[&str] = &[
    "Assets",
    "AssetsCurrent",
    "CashAndCashEquivalentsAtCarryingValue",
    "AccountsReceivableNetCurrent",
    "InventoryNet",
    "PropertyPlantAndEquipmentNet",
    "Goodwill",
    "IntangibleAssetsNetExcludingGoodwill",
    "Liabilities",
    "LiabilitiesCurrent",
    "AccountsPayableCurrent",
    "LongTermDebtNoncurrent",
    "StockholdersEquity",
    "RetainedEarningsAccumulatedDeficit",
    "LiabilitiesAndStockholdersEquity",
    "CommonStockSharesOutstanding",
];

/// Income statement line items (durations).
pub const INCOME_STATEMENT_TAGS: &[&str] = &[
    "Revenues",
    "RevenueFromContractWithCustomerExcludingAssessedTax",
    "SalesRevenueNet",
    "CostOfRevenue",
    "CostOfGoodsAndServicesSold",
    "GrossProfit",
    "ResearchAndDevelopmentExpense",
    "SellingGeneralAndAdministrativeExpense",
    "OperatingExpenses",
    "OperatingIncomeLoss",
    "InterestExpense",
    "IncomeLossFromContinuingOperationsBeforeIncomeTaxesExtraordinaryItemsNoncontrollingInterest",
    "IncomeTaxExpenseBenefit",
    "NetIncomeLoss",
    "EarningsPerShareBasic",
    "EarningsPerShareDiluted",
    "WeightedAverageNumberOfSharesOutstandingBasic",
    "WeightedAverageNumberOfDilutedSharesOutstanding",
];

/// Cash flow line items (durations).
pub const CASH_FLOW_TAGS: &[&str] = &[
    "NetCashProvidedByUsedInOperatingActivities",
    "NetCashProvidedByUsedInInvestingActivities",
    "NetCashProvidedByUsedInFinancingActivities",
    "DepreciationDepletionAndAmortization",
    "ShareBasedCompensation",
    "PaymentsToAcquirePropertyPlantAndEquipment",
    "PaymentsOfDividends",
    "PaymentsForRepurchaseOfCommonStock",
    "ProceedsFromIssuanceOfLongTermDebt",
    "RepaymentsOfLongTermDebt",
    "CashCashEquivalentsRestrictedCashAndRestrictedCashEquivalentsPeriodIncreaseDecreaseIncludingExchangeRateEffect",
];

/// The tag vocabulary of a statement.
#[must_use]
pub const fn statement_tags(kind: StatementType) -> &'static [&'static str] {
    match kind {
        StatementType::BalanceSheet => BALANCE_SHEET_TAGS,
        StatementType::IncomeStatement => INCOME_STATEMENT_TAGS,
        StatementType::CashFlow => CASH_FLOW_TAGS,
    }
}

/// Extracts the three statements of one filing.
///
/// A filing without any recognised US-GAAP fact yields an empty extract.
///
/// # Errors
/// Returns [`StatementsError::Table`](statements_core::StatementsError::Table)
/// if a statement table cannot be built.
#[instrument(skip_all, fields(accession = %filing.accession))]
pub fn extract_statements(filing: &Filing, dataset: &Dataset) -> Result<StatementExtract> {
    let facts = gaap_facts(filing, dataset);
    let preferred = filing.category.duration_quarters();

    let mut extract = StatementExtract::new();
    for kind in StatementType::ALL {
        let vocabulary: HashSet<&str> = statement_tags(kind).iter().copied().collect();
        let candidates: Vec<&Fact> = facts
            .iter()
            .filter(|f| vocabulary.contains(f.tag.as_str()))
            .collect();

        let selected = if kind.is_duration() {
            select_durations(candidates, preferred)
        } else {
            select_instants(candidates)
        };

        debug!(statement = %kind, rows = selected.len(), "Selected facts");
        extract.insert(kind, to_frame(kind, &selected)?);
    }

    Ok(extract)
}

/// Facts of the filing joined to their definitions, restricted to US-GAAP.
fn gaap_facts(filing: &Filing, dataset: &Dataset) -> Vec<Fact> {
    dataset
        .facts_for(&filing.accession)
        .filter_map(|raw| {
            let def = dataset.tag_definition(&raw.tag, &raw.version)?;
            let version = if raw.version.is_empty() {
                def.version.clone()
            } else {
                raw.version.clone()
            };
            if !version.contains(GAAP_MARKER) {
                return None;
            }
            let label = if def.tlabel.trim().is_empty() {
                raw.tag.clone()
            } else {
                def.tlabel.clone()
            };
            Some(Fact {
                accession: raw.adsh.clone(),
                tag: raw.tag.clone(),
                label,
                value: raw.value.trim().to_string(),
                uom: raw.uom.clone(),
                period_end: parse_sec_date(&raw.ddate),
                quarters: raw.qtrs.trim().parse::<u32>().ok().filter(|q| *q > 0),
                version,
                dimensional: !raw.segments.trim().is_empty() || !raw.coreg.trim().is_empty(),
            })
        })
        .collect()
}

/// Latest dated value per tag, consolidated entity first.
fn select_instants(mut facts: Vec<&Fact>) -> Vec<&Fact> {
    facts.retain(|f| f.period_end.is_some());
    // Stable sort keeps source order among equal keys.
    facts.sort_by_key(|f| (Reverse(f.period_end), f.dimensional));
    first_per_tag(facts)
}

/// One duration value per tag: latest date, then the filing's natural
/// duration, then consolidated entity.
fn select_durations(mut facts: Vec<&Fact>, preferred: u32) -> Vec<&Fact> {
    facts.retain(|f| f.quarters.is_some());
    facts.sort_by(|a, b| {
        a.tag
            .cmp(&b.tag)
            .then_with(|| latest_first(a, b))
            .then_with(|| (a.quarters != Some(preferred)).cmp(&(b.quarters != Some(preferred))))
            .then_with(|| a.dimensional.cmp(&b.dimensional))
    });
    first_per_tag(facts)
}

/// Descending by period end; undated facts last.
fn latest_first(a: &Fact, b: &Fact) -> Ordering {
    match (a.period_end, b.period_end) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn first_per_tag(facts: Vec<&Fact>) -> Vec<&Fact> {
    let mut seen = HashSet::new();
    facts
        .into_iter()
        .filter(|f| seen.insert(f.tag.clone()))
        .collect()
}

fn to_frame(kind: StatementType, facts: &[&Fact]) -> Result<DataFrame> {
    let tags: Vec<&str> = facts.iter().map(|f| f.tag.as_str()).collect();
    let labels: Vec<&str> = facts.iter().map(|f| f.label.as_str()).collect();
    let values: Vec<&str> = facts.iter().map(|f| f.value.as_str()).collect();
    let dates: Vec<Option<String>> = facts
        .iter()
        .map(|f| f.period_end.map(|d| d.to_string()))
        .collect();
    let units: Vec<&str> = facts.iter().map(|f| f.uom.as_str()).collect();

    let mut cols = vec![
        Column::new(columns::TAG.into(), tags),
        Column::new(columns::LABEL.into(), labels),
        Column::new(columns::VALUE.into(), values),
        Column::new(columns::DDATE.into(), dates),
        Column::new(columns::UOM.into(), units),
    ];
    if kind.is_duration() {
        let quarters: Vec<Option<i64>> = facts
            .iter()
            .map(|f| f.quarters.map(i64::from))
            .collect();
        cols.push(Column::new(columns::QTRS.into(), quarters));
    }

    Ok(DataFrame::new(cols)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use statements_core::{Cik, FilingCategory, NumericFact, TagDefinition};

    const ADSH: &str = "0000012345-24-000001";

    fn fact(tag: &str, version: &str, ddate: &str, qtrs: &str, value: &str) -> NumericFact {
        NumericFact {
            adsh: ADSH.to_string(),
            tag: tag.to_string(),
            version: version.to_string(),
            ddate: ddate.to_string(),
            qtrs: qtrs.to_string(),
            uom: "USD".to_string(),
            value: value.to_string(),
            ..Default::default()
        }
    }

    fn definition(tag: &str, version: &str) -> TagDefinition {
        TagDefinition {
            tag: tag.to_string(),
            version: version.to_string(),
            tlabel: format!("{tag} label"),
        }
    }

    fn filing(category: FilingCategory) -> Filing {
        Filing {
            accession: ADSH.to_string(),
            cik: Cik::new(12345),
            name: "ACME CORP".to_string(),
            category,
            filed: None,
            period_end: None,
            fiscal_year: Some(2024),
            fiscal_period: "Q2".to_string(),
        }
    }

    fn dataset(facts: Vec<NumericFact>) -> Dataset {
        let tags = vec![
            definition("Assets", "us-gaap/2023"),
            definition("Liabilities", "us-gaap/2023"),
            definition("Revenues", "us-gaap/2023"),
            definition("NetIncomeLoss", "us-gaap/2023"),
            definition("Assets", "acme/2024"),
        ];
        Dataset::new("2024q3".parse().unwrap(), Vec::new(), facts, tags)
    }

    fn column_strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn test_balance_sheet_keeps_latest_date() {
        let data = dataset(vec![
            fact("Assets", "us-gaap/2023", "20231231", "0", "900"),
            fact("Assets", "us-gaap/2023", "20240630", "0", "1100"),
        ]);
        let extract = extract_statements(&filing(FilingCategory::Quarterly), &data).unwrap();
        let bs = extract.get(StatementType::BalanceSheet).unwrap();

        assert_eq!(bs.height(), 1);
        assert_eq!(column_strings(bs, columns::VALUE), vec![Some("1100".to_string())]);
        assert_eq!(column_strings(bs, columns::DDATE), vec![Some("2024-06-30".to_string())]);
        assert_eq!(
            column_strings(bs, columns::LABEL),
            vec![Some("Assets label".to_string())]
        );
        assert!(bs.column(columns::QTRS).is_err());
    }

    #[test]
    fn test_consolidated_entity_wins_ties() {
        let mut segmented = fact("Assets", "us-gaap/2023", "20240630", "0", "1");
        segmented.segments = "BusinessSegments=Widgets;".to_string();
        let data = dataset(vec![
            segmented,
            fact("Assets", "us-gaap/2023", "20240630", "0", "1100"),
        ]);
        let extract = extract_statements(&filing(FilingCategory::Quarterly), &data).unwrap();
        let bs = extract.get(StatementType::BalanceSheet).unwrap();
        assert_eq!(column_strings(bs, columns::VALUE), vec![Some("1100".to_string())]);
    }

    #[test]
    fn test_custom_taxonomy_is_excluded() {
        let data = dataset(vec![
            fact("Assets", "acme/2024", "20240630", "0", "5"),
            fact("Liabilities", "us-gaap/2023", "20240630", "0", "400"),
        ]);
        let extract = extract_statements(&filing(FilingCategory::Quarterly), &data).unwrap();
        let bs = extract.get(StatementType::BalanceSheet).unwrap();
        assert_eq!(column_strings(bs, columns::TAG), vec![Some("Liabilities".to_string())]);
    }

    #[test]
    fn test_undefined_tags_are_dropped() {
        let data = dataset(vec![fact("Assets", "us-gaap/2019", "20240630", "0", "5")]);
        let extract = extract_statements(&filing(FilingCategory::Quarterly), &data).unwrap();
        assert!(extract.is_empty());
    }

    #[test]
    fn test_duration_prefers_filing_cadence() {
        let data = dataset(vec![
            fact("Revenues", "us-gaap/2023", "20240630", "2", "500"),
            fact("Revenues", "us-gaap/2023", "20240630", "1", "260"),
            fact("Revenues", "us-gaap/2023", "20230630", "1", "240"),
            fact("NetIncomeLoss", "us-gaap/2023", "20240630", "0", "9"),
        ]);

        let quarterly = extract_statements(&filing(FilingCategory::Quarterly), &data).unwrap();
        let is = quarterly.get(StatementType::IncomeStatement).unwrap();
        assert_eq!(column_strings(is, columns::TAG), vec![Some("Revenues".to_string())]);
        assert_eq!(column_strings(is, columns::VALUE), vec![Some("260".to_string())]);
        let qtrs: Vec<Option<i64>> = is
            .column(columns::QTRS)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(qtrs, vec![Some(1)]);

        // No 4-quarter value, so the first in source order among the latest wins.
        let annual = extract_statements(&filing(FilingCategory::Annual), &data).unwrap();
        let is = annual.get(StatementType::IncomeStatement).unwrap();
        assert_eq!(column_strings(is, columns::VALUE), vec![Some("500".to_string())]);
    }

    #[test]
    fn test_other_filings_are_ignored() {
        let mut other = fact("Assets", "us-gaap/2023", "20240630", "0", "5");
        other.adsh = "0000099999-24-000001".to_string();
        let data = dataset(vec![other]);

        let extract = extract_statements(&filing(FilingCategory::Quarterly), &data).unwrap();
        assert!(extract.is_empty());
        assert!(extract.get(StatementType::CashFlow).is_none());
    }

    #[test]
    fn test_vocabularies_are_disjoint() {
        let mut seen = HashSet::new();
        for kind in StatementType::ALL {
            for tag in statement_tags(kind) {
                assert!(seen.insert(*tag), "{tag} appears in more than one statement");
            }
        }
    }
}
