use fpa_copilot::*;

fn print_answer(answer: &Answer) {
    if let Some(guidance) = answer.guidance() {
        println!("  {}", guidance);
        return;
    }

    match answer {
        Answer::RevenueVsBudget(result) => {
            println!("  Revenue vs Budget - {} ({})", result.month, result.requested_currency);
            println!("  Actual (USD): {:.0}", result.actual_usd);
            println!("  Budget (USD): {:.0}", result.budget_usd);
        }
        Answer::GrossMarginTrend {
            window_months,
            points,
        } => {
            println!("  Gross Margin % - Last {} months", window_months);
            if points.is_empty() {
                println!("  No data.");
            }
            for point in points {
                match point.gm_pct {
                    Some(pct) => println!("  {}: {:.1}%", point.month, pct),
                    None => println!("  {}: n/a (no revenue)", point.month),
                }
            }
        }
        Answer::OpexBreakdown { month, lines } => {
            println!("  Opex Breakdown - {}", month);
            if lines.is_empty() {
                println!("  No data.");
            }
            for line in lines {
                println!("  {:<24} {:>12.0}", line.account, line.amount_usd);
            }
        }
        Answer::CashRunway(runway) => {
            println!("  Cash (USD): {:.0}", runway.cash_usd);
            match runway.runway_months {
                Some(months) => println!("  Runway (months): {:.1}", months),
                None => println!("  Runway: N/A (no burn or negative burn)."),
            }
        }
        Answer::NeedMonth { .. } | Answer::Unsupported => {}
    }
}

fn main() {
    let engine = MetricsEngine::new(FpaConfig::from_env());

    let questions: Vec<String> = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            vec![
                "What was June 2025 revenue vs budget in USD?".to_string(),
                "Show Gross Margin % trend for the last 3 months".to_string(),
                "Break down Opex by category for June 2025".to_string(),
                "What is our cash runway right now?".to_string(),
                "Break down Opex by category".to_string(),
                "what's the weather".to_string(),
            ]
        } else {
            vec![args.join(" ")]
        }
    };

    for question in &questions {
        println!("Q: {}", question);
        match ask(&engine, question) {
            Ok((_, answer)) => print_answer(&answer),
            Err(e) => println!("  Could not answer: {}", e),
        }
        println!();
    }
}
