//! Deterministic artifact file names: `<category>_<slug>_<YYYYMMDD>.svg`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use marketbrief_core::compact_day;
use time::Date;

use crate::ChartJob;

pub const EXTENSION: &str = "svg";

/// Lowercase ASCII slug; every run of other characters becomes one `-`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        String::from("series")
    } else {
        slug
    }
}

/// Assigns one path per job, in job order. Names that would collide get a
/// `-2`, `-3`, ... suffix in the order the jobs were given, so the same job
/// list always yields the same names.
pub fn plan_paths(jobs: &[ChartJob], output_dir: &Path, date: Date) -> Vec<PathBuf> {
    let stamp = compact_day(date);
    let mut taken = HashSet::with_capacity(jobs.len());

    jobs.iter()
        .map(|job| {
            let base = format!("{}_{}", job.category().as_str(), slugify(job.name_stem()));
            let mut candidate = base.clone();
            let mut suffix = 2;
            while !taken.insert(candidate.clone()) {
                candidate = format!("{base}-{suffix}");
                suffix += 1;
            }
            output_dir.join(format!("{candidate}_{stamp}.{EXTENSION}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use marketbrief_core::{NormalizedSeries, SeriesId, SeriesMetadata, SourceKind};
    use time::macros::date;

    use super::*;

    fn individual(id: &str) -> ChartJob {
        ChartJob::Individual {
            series: NormalizedSeries::empty(SeriesMetadata::new(
                SeriesId::parse(id).expect("id"),
                id,
                SourceKind::RemoteMarket,
            )),
        }
    }

    #[test]
    fn slugs_are_lowercase_ascii() {
        assert_eq!(slugify("^GSPC"), "gspc");
        assert_eq!(slugify("us_cpi"), "us-cpi");
        assert_eq!(slugify("7203.T"), "7203-t");
        assert_eq!(slugify("^^^"), "series");
    }

    #[test]
    fn plans_are_stable_and_collision_free() {
        let jobs = vec![individual("BRK.B"), individual("brk-b"), individual("^GSPC")];
        let dir = Path::new("graphs");

        let first = plan_paths(&jobs, dir, date!(2024 - 05 - 01));
        let second = plan_paths(&jobs, dir, date!(2024 - 05 - 01));

        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                dir.join("individual_brk-b_20240501.svg"),
                dir.join("individual_brk-b-2_20240501.svg"),
                dir.join("individual_gspc_20240501.svg"),
            ]
        );
    }
}
