//! Summary report
//!
//! Without `--user` this mirrors the dashboard (every user, high-spending
//! check included); with it, the owner's expense list view.

use anyhow::Result;
use tally_core::aggregate::{CategoryTotal, MonthlyTotal, UserTotal};
use tally_core::db::Database;
use tally_core::{ContextAssembler, Settings};

use super::find_user;

pub fn cmd_summary(
    db: &Database,
    settings: &Settings,
    username: Option<&str>,
    json: bool,
) -> Result<()> {
    let assembler = ContextAssembler::new(db, settings);

    match username {
        None => {
            let ctx = assembler.dashboard()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ctx)?);
                return Ok(());
            }

            println!();
            println!("📊 Spending Summary (all users)");
            println!("   ─────────────────────────────");
            println!(
                "   Total spent:  {}",
                settings.format_amount(ctx.total_expense)
            );
            println!(
                "   Income:       {}",
                settings.format_amount(ctx.total_income)
            );
            println!("   Savings:      {}", settings.format_amount(ctx.savings));
            println!("   Expenses:     {}", ctx.transactions);
            print_monthly(settings, &ctx.monthly);
            print_categories(settings, &ctx.by_category);
            print_users(db, settings, &ctx.by_user)?;
            print_suggestions(&ctx.suggestions);
        }
        Some(name) => {
            let user = find_user(db, name)?;
            let ctx = assembler.expense_list(user.id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ctx)?);
                return Ok(());
            }

            println!();
            println!("📊 Spending Summary ({})", user.username);
            println!("   ─────────────────────────────");
            println!("   Total spent:  {}", settings.format_amount(ctx.total));
            println!("   Expenses:     {}", ctx.expenses.len());
            print_categories(settings, &ctx.category_data);
            print_suggestions(&ctx.suggestions);
        }
    }

    Ok(())
}

fn print_monthly(settings: &Settings, monthly: &[MonthlyTotal]) {
    if monthly.is_empty() {
        return;
    }
    println!();
    println!("   By month:");
    for m in monthly {
        println!(
            "     {:>4} {:12} {:>14}",
            m.year,
            m.label,
            settings.format_amount(m.total)
        );
    }
}

fn print_categories(settings: &Settings, categories: &[CategoryTotal]) {
    if categories.is_empty() {
        return;
    }
    println!();
    println!("   By category:");
    for c in categories {
        println!(
            "     {:20} {:>14}",
            c.category,
            settings.format_amount(c.total)
        );
    }
}

fn print_users(db: &Database, settings: &Settings, by_user: &[UserTotal]) -> Result<()> {
    if by_user.is_empty() {
        return Ok(());
    }
    let users = db.list_users()?;

    println!();
    println!("   By user:");
    for u in by_user {
        let name = users
            .iter()
            .find(|user| user.id == u.user_id)
            .map(|user| user.username.as_str())
            .unwrap_or("?");
        println!("     {:20} {:>14}", name, settings.format_amount(u.total));
    }
    Ok(())
}

fn print_suggestions(suggestions: &[String]) {
    println!();
    println!("💡 Insights");
    for line in suggestions {
        println!("   • {}", line);
    }
}
