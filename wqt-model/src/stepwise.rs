use crate::error::Result;
use crate::ols::{fit, OlsFit};
use crate::term::ModelSpec;
use serde::{Deserialize, Serialize};
use wqt_data::TrendDataset;

/// One elimination step of the backward-AIC reduction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepwiseStep {
    pub dropped: String,
    pub aic_before: f64,
    pub aic_after: f64,
}

/// Result of a backward-AIC model reduction: the reduced fit plus the
/// elimination trace for the report.
#[derive(Debug)]
pub struct StepwiseResult {
    pub fit: OlsFit,
    pub trace: Vec<StepwiseStep>,
}

/// Reduce `start` by backward elimination on AIC.
///
/// The procedure is deterministic by construction: candidates are the
/// terms not contained in any remaining higher-order term
/// (marginality), each candidate's single-term deletion is refit, the
/// deletion with the lowest AIC wins with ties going to the earliest
/// term in specification order, and elimination stops when no deletion
/// lowers the AIC. A different stopping rule would select a different
/// model, so this one is fixed rather than configurable.
pub fn backward_aic(data: &TrendDataset, start: &ModelSpec) -> Result<StepwiseResult> {
    let mut spec = start.clone();
    let mut current = fit(data, &spec)?;
    let mut trace = Vec::new();

    loop {
        let candidates: Vec<usize> = (0..spec.terms.len())
            .filter(|&i| {
                let term = &spec.terms[i];
                !spec
                    .terms
                    .iter()
                    .any(|other| other.contains(term))
            })
            .collect();
        if candidates.is_empty() {
            break;
        }

        let mut best: Option<(usize, OlsFit)> = None;
        for idx in candidates {
            let mut reduced = spec.clone();
            reduced.terms.remove(idx);
            let reduced_fit = fit(data, &reduced)?;
            // strict improvement keeps the earliest candidate on ties
            let is_better = match &best {
                Some((_, best_fit)) => reduced_fit.aic() < best_fit.aic(),
                None => true,
            };
            if is_better {
                best = Some((idx, reduced_fit));
            }
        }

        match best {
            Some((idx, reduced_fit)) if reduced_fit.aic() < current.aic() => {
                let dropped = spec.terms[idx].label();
                log::info!(
                    "stepwise: dropping {} (AIC {:.2} -> {:.2})",
                    dropped,
                    current.aic(),
                    reduced_fit.aic()
                );
                trace.push(StepwiseStep {
                    dropped,
                    aic_before: current.aic(),
                    aic_after: reduced_fit.aic(),
                });
                spec.terms.remove(idx);
                current = reduced_fit;
            }
            _ => break,
        }
    }

    Ok(StepwiseResult {
        fit: current,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::backward_aic;
    use crate::term::{ModelSpec, Term, Var};
    use crate::testdata;

    #[test]
    fn test_marginality_never_violated() {
        let data = testdata::synthetic();
        let result = backward_aic(&data, &ModelSpec::saturated_two_way()).unwrap();
        let terms = &result.fit.spec.terms;
        // every interaction still present implies both its main effects
        // are still present
        for term in terms {
            if let Term::Interaction(a, b) = term {
                assert!(terms.contains(&Term::Main(*a)), "{} orphaned", term.label());
                assert!(terms.contains(&Term::Main(*b)), "{} orphaned", term.label());
            }
        }
        // and every elimination step lowered the AIC
        for step in &result.trace {
            assert!(step.aic_after < step.aic_before);
        }
    }

    #[test]
    fn test_reduction_is_deterministic() {
        let data = testdata::synthetic();
        let a = backward_aic(&data, &ModelSpec::saturated_two_way()).unwrap();
        let b = backward_aic(&data, &ModelSpec::saturated_two_way()).unwrap();
        assert_eq!(a.fit.spec.terms, b.fit.spec.terms);
        assert_eq!(a.trace.len(), b.trace.len());
        for (sa, sb) in a.trace.iter().zip(&b.trace) {
            assert_eq!(sa.dropped, sb.dropped);
            assert_eq!(sa.aic_after.to_bits(), sb.aic_after.to_bits());
        }
    }

    #[test]
    fn test_first_drops_are_interactions() {
        // main effects are protected while their interactions remain
        let data = testdata::synthetic();
        let result = backward_aic(&data, &ModelSpec::saturated_two_way()).unwrap();
        for step in &result.trace {
            let mains = ["year", "station", "month"];
            if mains.contains(&step.dropped.as_str()) {
                // by the time a main effect drops, no interaction
                // naming it may remain in the final model
                let var = step.dropped.clone();
                assert!(result
                    .fit
                    .spec
                    .terms
                    .iter()
                    .all(|t| !matches!(t, Term::Interaction(a, b)
                        if a.label() == var || b.label() == var)));
            }
        }
    }

    #[test]
    fn test_pure_noise_interaction_is_dropped() {
        // station slopes in the synthetic data are real, but the
        // month effects carry no year interaction; year:month should go
        let data = testdata::synthetic();
        let start = ModelSpec::new(
            "start",
            vec![
                Term::Main(Var::Year),
                Term::Main(Var::Station),
                Term::Main(Var::Month),
                Term::Interaction(Var::Year, Var::Month),
            ],
        );
        let result = backward_aic(&data, &start).unwrap();
        assert!(!result
            .fit
            .spec
            .terms
            .contains(&Term::Interaction(Var::Year, Var::Month)));
    }
}
