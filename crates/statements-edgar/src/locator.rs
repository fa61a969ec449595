//! Locating a company's periodic filings within a dataset.

use crate::dataset::Dataset;
use statements_core::types::parse_sec_date;
use statements_core::{Cik, FilingCategory, Filing, Submission};
use tracing::debug;

/// Returns the company's filings of the requested category, in dataset order.
///
/// A submission matches when its numeric CIK equals `cik` and its form is
/// exactly the category's form, so amendments (`10-K/A`) are not included.
pub fn locate_filings(cik: Cik, category: FilingCategory, dataset: &Dataset) -> Vec<Filing> {
    let form = category.form();
    let filings: Vec<Filing> = dataset
        .submissions()
        .iter()
        .filter(|sub| sub.form.trim() == form)
        .filter(|sub| sub.cik.parse::<Cik>().is_ok_and(|c| c == cik))
        .map(|sub| to_filing(sub, cik, category))
        .collect();

    debug!(
        period = %dataset.period(),
        cik = %cik,
        form,
        count = filings.len(),
        "Located filings"
    );
    filings
}

fn to_filing(sub: &Submission, cik: Cik, category: FilingCategory) -> Filing {
    Filing {
        accession: sub.adsh.clone(),
        cik,
        name: sub.name.clone(),
        category,
        filed: parse_sec_date(&sub.filed),
        period_end: parse_sec_date(&sub.period),
        fiscal_year: sub.fy.trim().parse().ok(),
        fiscal_period: sub.fp.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn submission(adsh: &str, cik: &str, form: &str) -> Submission {
        Submission {
            adsh: adsh.to_string(),
            cik: cik.to_string(),
            name: "ACME CORP".to_string(),
            form: form.to_string(),
            filed: "20240501".to_string(),
            period: "20240331".to_string(),
            fy: "2024".to_string(),
            fp: "Q1".to_string(),
        }
    }

    fn dataset(subs: Vec<Submission>) -> Dataset {
        Dataset::new("2024q2".parse().unwrap(), subs, Vec::new(), Vec::new())
    }

    #[test]
    fn test_locate_matches_cik_and_form() {
        let data = dataset(vec![
            submission("a-1", "12345", "10-Q"),
            submission("a-2", "12345", "10-K"),
            submission("a-3", "99999", "10-Q"),
            submission("a-4", "0000012345", "10-Q"),
            submission("a-5", "12345", "10-Q/A"),
        ]);

        let filings = locate_filings(Cik::new(12345), FilingCategory::Quarterly, &data);
        let accessions: Vec<_> = filings.iter().map(|f| f.accession.as_str()).collect();
        assert_eq!(accessions, vec!["a-1", "a-4"]);

        let first = &filings[0];
        assert_eq!(first.category, FilingCategory::Quarterly);
        assert_eq!(first.period_end, NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(first.filed, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(first.fiscal_year, Some(2024));
        assert_eq!(first.fiscal_period, "Q1");
        assert_eq!(first.period_label(), "2024-03-31");
    }

    #[test]
    fn test_locate_annual() {
        let data = dataset(vec![
            submission("a-1", "12345", "10-Q"),
            submission("a-2", "12345", "10-K"),
        ]);
        let filings = locate_filings(Cik::new(12345), FilingCategory::Annual, &data);
        assert_eq!(filings.len(), 1);
        assert_eq!(filings[0].accession, "a-2");
    }

    #[test]
    fn test_locate_nothing_is_not_an_error() {
        let data = dataset(vec![submission("a-1", "not-a-number", "10-Q")]);
        assert!(locate_filings(Cik::new(12345), FilingCategory::Quarterly, &data).is_empty());
    }
}
