use serde::{Deserialize, Serialize};

/// An analysis variable. Year is numeric; station and month are
/// categorical with treatment coding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Var {
    Year,
    /// Squared (mean-centered) year, for the curvature check.
    YearSquared,
    Station,
    Month,
}

impl Var {
    pub fn label(&self) -> &'static str {
        match self {
            Var::Year => "year",
            Var::YearSquared => "year^2",
            Var::Station => "station",
            Var::Month => "month",
        }
    }
}

/// A single model term, in the order-sensitive sense of a sequential
/// ANOVA: the position of a term in a [`ModelSpec`] determines which
/// variance is attributed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// Main effect of one variable.
    Main(Var),
    /// Pairwise interaction, treatment-coded (products of the reduced
    /// dummy columns).
    Interaction(Var, Var),
    /// One `num` slope column per level of `cat`, using every level.
    /// Used when the numeric main effect is absent from the model, so
    /// each level carries its own directly readable slope.
    SlopePerLevel { cat: Var, num: Var },
}

impl Term {
    pub fn label(&self) -> String {
        match self {
            Term::Main(v) => v.label().to_string(),
            Term::Interaction(a, b) => format!("{}:{}", a.label(), b.label()),
            Term::SlopePerLevel { cat, num } => format!("{}:{}", cat.label(), num.label()),
        }
    }

    /// Variables appearing in this term.
    pub fn vars(&self) -> Vec<Var> {
        match self {
            Term::Main(v) => vec![*v],
            Term::Interaction(a, b) => vec![*a, *b],
            Term::SlopePerLevel { cat, num } => vec![*cat, *num],
        }
    }

    /// Marginality: true if `other` is a lower-order term whose
    /// variables all appear in `self`. A main effect is never dropped
    /// while an interaction containing it remains.
    pub fn contains(&self, other: &Term) -> bool {
        if self == other {
            return false;
        }
        let own = self.vars();
        other.vars().iter().all(|v| own.contains(v))
    }
}

/// An ordered list of model terms over log(TN). The intercept is
/// implicit and always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub name: String,
    pub terms: Vec<Term>,
}

impl ModelSpec {
    pub fn new(name: &str, terms: Vec<Term>) -> ModelSpec {
        ModelSpec {
            name: name.to_string(),
            terms,
        }
    }

    /// The saturated two-way specification: all three main effects and
    /// all pairwise interactions. Fit only to test whether
    /// station-specific trends differ.
    pub fn saturated_two_way() -> ModelSpec {
        ModelSpec::new(
            "saturated two-way",
            vec![
                Term::Main(Var::Year),
                Term::Main(Var::Station),
                Term::Main(Var::Month),
                Term::Interaction(Var::Year, Var::Station),
                Term::Interaction(Var::Year, Var::Month),
                Term::Interaction(Var::Station, Var::Month),
            ],
        )
    }

    /// The curvature check: degree-2 polynomial in year, its
    /// interaction with station, plus month and month-by-year terms.
    /// Consumed only through a nested F-test.
    pub fn polynomial_check() -> ModelSpec {
        ModelSpec::new(
            "polynomial check",
            vec![
                Term::Main(Var::Year),
                Term::Main(Var::YearSquared),
                Term::Main(Var::Station),
                Term::Interaction(Var::Year, Var::Station),
                Term::Interaction(Var::YearSquared, Var::Station),
                Term::Main(Var::Month),
                Term::Interaction(Var::Year, Var::Month),
            ],
        )
    }

    /// The reporting model: a separate year slope per station (no
    /// shared year effect), station and month main effects. The
    /// per-station slopes are the deliverable.
    pub fn per_station_trend() -> ModelSpec {
        ModelSpec::new(
            "per-station trend",
            vec![
                Term::Main(Var::Station),
                Term::SlopePerLevel {
                    cat: Var::Station,
                    num: Var::Year,
                },
                Term::Main(Var::Month),
            ],
        )
    }

    /// Human-readable formula, e.g.
    /// `log(TN) ~ year + station + month + year:station`.
    pub fn formula(&self) -> String {
        if self.terms.is_empty() {
            return "log(TN) ~ 1".to_string();
        }
        let terms: Vec<String> = self.terms.iter().map(Term::label).collect();
        format!("log(TN) ~ {}", terms.join(" + "))
    }
}
