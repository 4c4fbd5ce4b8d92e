use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{terminal_size, Width};

use crate::churn::{ChurnAssessment, ChurnSummary, RiskLevel};
use crate::forecast::Forecast;
use crate::report::Report;
use crate::scoring::{ScoredLead, Tier};
use crate::segment::Segmentation;
use crate::team::TeamSummary;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format scored leads as a table with columns: index, score, tier, name,
/// stage. Names are truncated to the terminal width; pipes get full names.
pub fn format_scored_leads(scored: &[ScoredLead], use_colors: bool) -> String {
    if scored.is_empty() {
        return "No leads found.".to_string();
    }

    let term_width = get_terminal_width();
    let index_width = 3;
    let score_width = 5;
    let tier_width = 4;
    let separator = "  ";

    scored
        .iter()
        .enumerate()
        .map(|(idx, lead)| {
            let index_str = format!("{:>2}.", idx + 1);
            let score_str = format!("{:>score_width$.1}", lead.score);
            let stage = lead.stage.as_str();

            let fixed_width =
                index_width + 1 + score_width + tier_width + separator.len() * 3 + stage.len();
            let name = if let Some(width) = term_width {
                if width > fixed_width + 10 {
                    truncate_name(&lead.name, width - fixed_width)
                } else {
                    truncate_name(&lead.name, 20)
                }
            } else {
                lead.name.clone()
            };

            // Pad before colorizing so escape codes do not throw off alignment
            let tier_padded = format!("{:<tier_width$}", lead.tier.as_str());
            let tier = if use_colors {
                match lead.tier {
                    Tier::Hot => tier_padded.red().bold().to_string(),
                    Tier::Warm => tier_padded.yellow().to_string(),
                    Tier::Cold => tier_padded.cyan().to_string(),
                }
            } else {
                tier_padded
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    score_str.bold(),
                    separator,
                    tier,
                    separator,
                    name,
                    separator,
                    stage.dimmed()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}{}",
                    index_str, score_str, separator, tier, separator, name, separator, stage
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Multi-line factor breakdown for a single lead (verbose mode). Model-path
/// scores have no per-factor decomposition and say so.
pub fn format_score_breakdown(lead: &ScoredLead, use_colors: bool) -> String {
    let header = if use_colors {
        format!(
            "{} {} ({})",
            lead.name.bold(),
            format!("{:.1}", lead.score).bold(),
            lead.tier.as_str()
        )
    } else {
        format!("{} {:.1} ({})", lead.name, lead.score, lead.tier.as_str())
    };

    let Some(ref breakdown) = lead.breakdown else {
        return format!("{header}\n  scored by conversion model");
    };

    let mut lines = vec![header, format!("  base: {:.1}", breakdown.base_score)];
    for factor in &breakdown.factors {
        lines.push(format!(
            "  {}: {} ({:.1} -> {:.1})",
            factor.label, factor.description, factor.before, factor.after
        ));
    }
    lines.join("\n")
}

/// Tab-separated scored leads for scripting: lead_id, score, tier, stage,
/// name. No headers, no colors.
pub fn format_scored_tsv(scored: &[ScoredLead]) -> String {
    scored
        .iter()
        .map(|lead| {
            format!(
                "{}\t{:.1}\t{}\t{}\t{}",
                lead.lead_id,
                lead.score,
                lead.tier.as_str(),
                lead.stage.as_str(),
                lead.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_segments(segmentation: &Segmentation, use_colors: bool) -> String {
    if segmentation.profiles.is_empty() {
        return "No customers to segment.".to_string();
    }

    let mut lines = Vec::new();
    for profile in &segmentation.profiles {
        let name = if use_colors {
            profile.segment.bold().to_string()
        } else {
            profile.segment.clone()
        };
        lines.push(format!(
            "{} ({} customers)\n  avg spend: ${:.2}/mo\n  avg revenue potential: ${:.0}\n  avg tenure: {:.1} months",
            name, profile.size, profile.avg_monthly_spend, profile.avg_revenue_potential,
            profile.avg_tenure_months
        ));
    }
    lines.join("\n")
}

pub fn format_segments_tsv(segmentation: &Segmentation) -> String {
    segmentation
        .assignments
        .iter()
        .map(|a| format!("{}\t{}\t{:.2}\t{}", a.lead_id, a.name, a.monthly_spend, a.segment))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_churn(
    assessments: &[ChurnAssessment],
    summary: &ChurnSummary,
    use_colors: bool,
) -> String {
    if assessments.is_empty() {
        return "No customers found.".to_string();
    }

    let mut lines: Vec<String> = assessments
        .iter()
        .map(|a| {
            let level_padded = format!("{:<6}", a.level.as_str());
            let level = if use_colors {
                match a.level {
                    RiskLevel::High => level_padded.red().bold().to_string(),
                    RiskLevel::Medium => level_padded.yellow().to_string(),
                    RiskLevel::Low => level_padded.green().to_string(),
                }
            } else {
                level_padded
            };
            let flag = if a.churned { " (churned)" } else { "" };
            format!("{:>5.1}  {}  {}{}", a.risk, level, a.name, flag)
        })
        .collect();
    lines.push(format!(
        "\n{} customers, churn rate {:.1}%, {} at risk ({} low / {} medium / {} high)",
        summary.customers, summary.churn_rate, summary.at_risk, summary.low, summary.medium,
        summary.high
    ));
    lines.join("\n")
}

pub fn format_churn_tsv(assessments: &[ChurnAssessment]) -> String {
    assessments
        .iter()
        .map(|a| {
            format!(
                "{}\t{:.1}\t{}\t{}\t{}",
                a.lead_id,
                a.risk,
                a.level.as_str(),
                u8::from(a.churned),
                a.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_forecast(forecast: &Forecast, use_colors: bool) -> String {
    let mut lines = Vec::new();
    if forecast.history.is_empty() {
        lines.push("No revenue history.".to_string());
    } else {
        lines.push("History:".to_string());
        for month in &forecast.history {
            lines.push(format!(
                "  {}  ${:>10.2}  ({} deals)",
                month.month.format("%Y-%m"),
                month.revenue,
                month.deals
            ));
        }
    }
    let method = if use_colors {
        forecast.method.as_str().dimmed().to_string()
    } else {
        forecast.method.as_str().to_string()
    };
    lines.push(format!("Projection ({method}):"));
    for point in &forecast.projections {
        let value = format!("${:>10.2}", point.projected);
        if use_colors {
            lines.push(format!(
                "  {}  {}",
                point.month.format("%Y-%m"),
                value.bold()
            ));
        } else {
            lines.push(format!("  {}  {}", point.month.format("%Y-%m"), value));
        }
    }
    lines.join("\n")
}

pub fn format_forecast_tsv(forecast: &Forecast) -> String {
    forecast
        .projections
        .iter()
        .map(|p| format!("{}\t{:.2}", p.month.format("%Y-%m"), p.projected))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_team(summary: &TeamSummary, use_colors: bool) -> String {
    if summary.reps.is_empty() {
        return "No closed deals.".to_string();
    }

    let mut lines = Vec::new();
    for rep in &summary.reps {
        let name = if use_colors {
            rep.rep.bold().to_string()
        } else {
            rep.rep.clone()
        };
        lines.push(format!(
            "{}\n  won: {} / lost: {} (win rate {:.1}%)\n  revenue: ${:.2} (avg deal ${:.2})",
            name, rep.deals_won, rep.deals_lost, rep.win_rate, rep.revenue, rep.avg_deal_size
        ));
    }
    let top = summary.top_performer.as_deref().unwrap_or("none");
    lines.push(format!(
        "\nTeam: ${:.2} over {} deals, win rate {:.1}%, top performer {}, workload {}",
        summary.total_revenue,
        summary.total_deals,
        summary.team_win_rate,
        top,
        if summary.balanced_workload {
            "balanced"
        } else {
            "uneven"
        }
    ));
    lines.join("\n")
}

pub fn format_team_tsv(summary: &TeamSummary) -> String {
    summary
        .reps
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}\t{:.1}\t{:.2}",
                r.rep, r.deals_won, r.deals_lost, r.win_rate, r.revenue
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_report(report: &Report, use_colors: bool) -> String {
    let mut lines = Vec::new();

    let section = |title: &str| {
        if use_colors {
            title.bold().underline().to_string()
        } else {
            format!("== {title} ==")
        }
    };

    lines.push(section("Pipeline"));
    lines.push(format!(
        "{} leads ({} active), {} customers, conversion rate {:.1}%",
        report.leads, report.active_leads, report.customers, report.conversion_rate
    ));
    for stage in &report.funnel {
        lines.push(format!("  {:<10} {}", stage.stage.as_str(), stage.count));
    }

    lines.push(section("Lead tiers"));
    for tier in &report.tiers {
        // Pad before colorizing so escape codes do not throw off alignment
        let label_padded = format!("{:<5}", tier.tier.as_str());
        let label = if use_colors {
            match tier.tier {
                Tier::Hot => label_padded.red().bold().to_string(),
                Tier::Warm => label_padded.yellow().to_string(),
                Tier::Cold => label_padded.cyan().to_string(),
            }
        } else {
            label_padded
        };
        lines.push(format!("  {} {}", label, tier.count));
    }

    lines.push(section("Segments"));
    if report.segments.is_empty() {
        lines.push("  none".to_string());
    }
    for profile in &report.segments {
        lines.push(format!(
            "  {:<9} {:>3} customers, avg spend ${:.2}/mo",
            profile.segment, profile.size, profile.avg_monthly_spend
        ));
    }

    lines.push(section("Churn"));
    lines.push(format!(
        "  rate {:.1}%, {} at risk ({} high / {} medium / {} low)",
        report.churn.churn_rate,
        report.churn.at_risk,
        report.churn.high,
        report.churn.medium,
        report.churn.low
    ));

    lines.push(section("Forecast"));
    lines.push(format!("  method: {}", report.forecast.method.as_str()));
    for point in &report.forecast.projections {
        lines.push(format!(
            "  {}  ${:.2}",
            point.month.format("%Y-%m"),
            point.projected
        ));
    }

    lines.push(section("Team"));
    lines.push(format!(
        "  ${:.2} over {} deals, win rate {:.1}%",
        report.team.total_revenue, report.team.total_deals, report.team.team_win_rate
    ));

    lines.push(section("Targets"));
    for verdict in &report.verdicts {
        let mark = if verdict.met { "ok" } else { "MISS" };
        let mark = if use_colors {
            if verdict.met {
                mark.green().to_string()
            } else {
                mark.red().bold().to_string()
            }
        } else {
            mark.to_string()
        };
        lines.push(format!(
            "  {:<16} {:.1} (target {:.1}) {}",
            verdict.kpi, verdict.actual, verdict.target, mark
        ));
    }

    lines.join("\n")
}
