//! `waymark resolve` command: route request text into a plan.

use anyhow::Result;
use console::style;

use waymark_core::service::ResolveOutcome;
use waymark_types::plan::{Confidence, PlanTarget, ResolutionPlan};
use waymark_types::request::{Request, RequestHints};

use crate::state::AppState;

/// Resolve `text` and print the plan.
///
/// `answers` are `skill-id/node-id=token` pairs; `tags` become extra
/// request tokens. With `interactive`, unanswered decision-tree
/// questions are prompted for instead of taking their defaults.
pub fn resolve(
    state: &AppState,
    text: &str,
    answers: &[String],
    tags: &[String],
    interactive: bool,
    json: bool,
) -> Result<()> {
    let mut hints = RequestHints {
        context_tags: tags.to_vec(),
        ..RequestHints::default()
    };
    for pair in answers {
        let (key, token) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid --answer '{pair}', expected KEY=TOKEN"))?;
        hints.answers.insert(key.to_owned(), token.to_owned());
    }

    let mut request = Request::with_hints(text, hints);

    let plan = if interactive {
        loop {
            match state.service.resolve_interactive(&request) {
                ResolveOutcome::Complete(plan) => break plan,
                ResolveOutcome::NeedsAnswer(q) => {
                    let picked = dialoguer::Select::new()
                        .with_prompt(format!("[{}] {}", q.skill_id, q.question))
                        .items(&q.options)
                        .default(0)
                        .interact()?;
                    request.hints.answers.insert(
                        Request::answer_key(&q.skill_id, &q.node_id),
                        q.options[picked].clone(),
                    );
                }
            }
        }
    } else {
        state.service.resolve_request(&request)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    print_plan(&plan);
    Ok(())
}

fn print_plan(plan: &ResolutionPlan) {
    println!();
    println!("  {} Resolution plan", style("⚡").bold());
    println!();

    for (i, step) in plan.steps.iter().enumerate() {
        let target = match &step.target {
            PlanTarget::Skill(id) => format!("{} {}", style("skill").dim(), style(id).cyan()),
            PlanTarget::Agent(id) => format!("{} {}", style("agent").dim(), style(id).magenta()),
        };
        let confidence = match step.confidence {
            Confidence::High => style("high").green(),
            Confidence::Medium => style("medium").yellow(),
            Confidence::Low => style("low").red(),
        };
        println!("  {}. {target}  [{confidence}]", i + 1);
        println!("     {}", style(&step.reason).dim());
    }

    if !plan.flags.is_empty() {
        println!();
        println!("  {}", style("── Flags ──").dim());
        for flag in &plan.flags {
            println!("  {} {flag:?}", style("!").yellow().bold());
        }
    }
    println!();
}
