//! Typed function calls and dispatch onto the analytics functions.
//!
//! The router turns a model reply into a [`RawCall`] (a name plus loosely
//! typed parameters). [`FunctionCall::from_parts`] validates it against the
//! closed set of callable functions before anything touches the data.

use std::fmt;

use serde_json::Value;

use tracing::info;

use super::analytics::{self, AnalyticsResult, DEFAULT_TOP_HOLDINGS_LIMIT};
use super::call_parser;
use super::error::FundchatError;
use super::fund_data::FundData;

/// A parameter value after best-effort coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

impl ParamValue {
    /// Integer if the text parses as one, otherwise text.
    pub fn coerce(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(n) => ParamValue::Int(n),
            Err(_) => ParamValue::Text(raw.to_string()),
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                None => ParamValue::Text(n.to_string()),
            }),
            Value::String(s) => Some(ParamValue::coerce(s)),
            Value::Bool(b) => Some(ParamValue::Text(b.to_string())),
            Value::Null => Some(ParamValue::Text(String::new())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// An unvalidated call as extracted from model output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCall {
    pub name: String,
    pub params: Vec<(String, ParamValue)>,
}

impl RawCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.params.push((key.into(), value));
        self
    }

    /// Last value wins when a key repeats.
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Build from `{"function": name, "arguments": {...}}`. `name` and
    /// `parameters` are accepted as key aliases.
    pub fn from_json(value: &Value) -> Option<Self> {
        let name = value
            .get("function")
            .or_else(|| value.get("name"))?
            .as_str()?
            .trim()
            .to_string();
        let mut call = RawCall::new(name);
        let args = value
            .get("arguments")
            .or_else(|| value.get("parameters"))
            .and_then(Value::as_object);
        if let Some(args) = args {
            for (k, v) in args {
                call.params.push((k.clone(), ParamValue::from_json(v)?));
            }
        }
        Some(call)
    }
}

/// One entry of the function catalogue shown to the model.
#[derive(Debug, Clone, Copy)]
pub struct FunctionDef {
    pub name: &'static str,
    pub params: &'static [&'static str],
    pub signature: &'static str,
    pub description: &'static str,
}

pub const FUNCTIONS: [FunctionDef; 7] = [
    FunctionDef {
        name: "get_total_trades",
        params: &["fund"],
        signature: "get_total_trades(fund=None)",
        description: "Get total trades count",
    },
    FunctionDef {
        name: "get_total_holdings",
        params: &["fund"],
        signature: "get_total_holdings(fund=None)",
        description: "Get total holdings count",
    },
    FunctionDef {
        name: "get_yearly_fund_performance",
        params: &[],
        signature: "get_yearly_fund_performance()",
        description: "Get yearly P&L by fund",
    },
    FunctionDef {
        name: "get_all_funds",
        params: &[],
        signature: "get_all_funds()",
        description: "List all available funds",
    },
    FunctionDef {
        name: "get_fund_comparison",
        params: &[],
        signature: "get_fund_comparison()",
        description: "Compare all funds",
    },
    FunctionDef {
        name: "get_fund_stats_by_type",
        params: &["fund"],
        signature: "get_fund_stats_by_type(fund=None)",
        description: "Get holdings by security type",
    },
    FunctionDef {
        name: "get_top_holdings",
        params: &["fund", "limit"],
        signature: "get_top_holdings(fund=None, limit=10)",
        description: "Get top holdings",
    },
];

pub fn find_function(name: &str) -> Option<&'static FunctionDef> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

/// A validated call to one analytics function.
#[derive(Debug, Clone, PartialEq)]
pub enum FunctionCall {
    TotalTrades { fund: Option<String> },
    TotalHoldings { fund: Option<String> },
    YearlyFundPerformance,
    AllFunds,
    FundComparison,
    FundStatsByType { fund: Option<String> },
    TopHoldings { fund: Option<String>, limit: usize },
}

impl FunctionCall {
    pub fn from_raw(raw: &RawCall) -> Result<Self, FundchatError> {
        Self::from_parts(&raw.name, &raw.params)
    }

    /// Validate a function name and its parameters.
    pub fn from_parts(name: &str, params: &[(String, ParamValue)]) -> Result<Self, FundchatError> {
        let def = find_function(name).ok_or_else(|| FundchatError::UnknownFunction {
            name: name.to_string(),
        })?;

        for (key, _) in params {
            if !def.params.contains(&key.as_str()) {
                return Err(FundchatError::InvalidParameter {
                    function: name.to_string(),
                    parameter: key.clone(),
                    reason: format!("{} accepts {}", name, accepted(def)),
                });
            }
        }

        let lookup = |key: &str| params.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v);
        let fund = lookup("fund").and_then(fund_value);

        let call = match def.name {
            "get_total_trades" => FunctionCall::TotalTrades { fund },
            "get_total_holdings" => FunctionCall::TotalHoldings { fund },
            "get_yearly_fund_performance" => FunctionCall::YearlyFundPerformance,
            "get_all_funds" => FunctionCall::AllFunds,
            "get_fund_comparison" => FunctionCall::FundComparison,
            "get_fund_stats_by_type" => FunctionCall::FundStatsByType { fund },
            "get_top_holdings" => FunctionCall::TopHoldings {
                fund,
                limit: limit_value(name, lookup("limit"))?,
            },
            other => {
                return Err(FundchatError::UnknownFunction {
                    name: other.to_string(),
                });
            }
        };
        Ok(call)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FunctionCall::TotalTrades { .. } => "get_total_trades",
            FunctionCall::TotalHoldings { .. } => "get_total_holdings",
            FunctionCall::YearlyFundPerformance => "get_yearly_fund_performance",
            FunctionCall::AllFunds => "get_all_funds",
            FunctionCall::FundComparison => "get_fund_comparison",
            FunctionCall::FundStatsByType { .. } => "get_fund_stats_by_type",
            FunctionCall::TopHoldings { .. } => "get_top_holdings",
        }
    }

    pub fn execute(&self, data: &FundData) -> AnalyticsResult {
        match self {
            FunctionCall::TotalTrades { fund } => analytics::get_total_trades(data, fund.as_deref()),
            FunctionCall::TotalHoldings { fund } => {
                analytics::get_total_holdings(data, fund.as_deref())
            }
            FunctionCall::YearlyFundPerformance => analytics::get_yearly_fund_performance(data),
            FunctionCall::AllFunds => analytics::get_all_funds(data),
            FunctionCall::FundComparison => analytics::get_fund_comparison(data),
            FunctionCall::FundStatsByType { fund } => {
                analytics::get_fund_stats_by_type(data, fund.as_deref())
            }
            FunctionCall::TopHoldings { fund, limit } => {
                analytics::get_top_holdings(data, fund.as_deref(), *limit)
            }
        }
    }

    /// Execute, turning an unknown fund or an empty result into an error.
    pub fn run(&self, data: &FundData) -> Result<AnalyticsResult, FundchatError> {
        info!(call = %self, "executing function");
        match self.execute(data) {
            AnalyticsResult::FundNotFound { fund } => Err(FundchatError::FundNotFound { fund }),
            result if result.is_empty() => Err(FundchatError::NoData {
                function: self.name().to_string(),
            }),
            result => Ok(result),
        }
    }
}

impl fmt::Display for FunctionCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        match self {
            FunctionCall::TotalTrades { fund }
            | FunctionCall::TotalHoldings { fund }
            | FunctionCall::FundStatsByType { fund } => {
                if let Some(fund) = fund {
                    write!(f, "fund={}", fund)?;
                }
            }
            FunctionCall::TopHoldings { fund, limit } => {
                if let Some(fund) = fund {
                    write!(f, "fund={}, ", fund)?;
                }
                write!(f, "limit={}", limit)?;
            }
            FunctionCall::YearlyFundPerformance
            | FunctionCall::AllFunds
            | FunctionCall::FundComparison => {}
        }
        write!(f, ")")
    }
}

fn accepted(def: &FunctionDef) -> String {
    if def.params.is_empty() {
        "no parameters".to_string()
    } else {
        def.params.join(", ")
    }
}

/// Models echo the catalogue's `fund=None` default; treat it as absent.
fn fund_value(value: &ParamValue) -> Option<String> {
    match value {
        ParamValue::Int(n) => Some(n.to_string()),
        ParamValue::Text(s) => {
            let s = s.trim();
            match s.to_lowercase().as_str() {
                "" | "none" | "null" => None,
                _ => Some(s.to_string()),
            }
        }
    }
}

fn limit_value(function: &str, value: Option<&ParamValue>) -> Result<usize, FundchatError> {
    let invalid = |reason: String| FundchatError::InvalidParameter {
        function: function.to_string(),
        parameter: "limit".to_string(),
        reason,
    };
    match value {
        None => Ok(DEFAULT_TOP_HOLDINGS_LIMIT),
        Some(ParamValue::Int(n)) => {
            usize::try_from(*n).map_err(|_| invalid(format!("{} is negative", n)))
        }
        Some(ParamValue::Text(s)) => match s.trim().to_lowercase().as_str() {
            "" | "none" | "null" => Ok(DEFAULT_TOP_HOLDINGS_LIMIT),
            _ => Err(invalid(format!("expected an integer, found '{}'", s))),
        },
    }
}

/// Validate and execute a call by name.
pub fn dispatch(
    data: &FundData,
    name: &str,
    params: &[(String, ParamValue)],
) -> Result<AnalyticsResult, FundchatError> {
    let call = FunctionCall::from_parts(name, params)?;
    Ok(call.execute(data))
}

/// Parse and run one function-call line. The `FUNCTION:` marker is optional.
pub fn run_line(data: &FundData, line: &str) -> Result<(FunctionCall, AnalyticsResult), FundchatError> {
    let raw = call_parser::parse(&call_parser::with_marker(line))?;
    let call = FunctionCall::from_raw(&raw)?;
    let result = call.run(data)?;
    Ok((call, result))
}
