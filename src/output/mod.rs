pub mod formatter;

pub use formatter::{
    format_churn, format_churn_tsv, format_forecast, format_forecast_tsv, format_report,
    format_score_breakdown, format_scored_leads, format_scored_tsv, format_segments,
    format_segments_tsv, format_team, format_team_tsv, should_use_colors,
};
