//! Concord Selection Demo
//!
//! Wires three authorities together:
//! - `fruits`: an open list that is edited directly
//! - `choice`: a selection that must stay a member of `fruits`
//! - `summary`: a derived line combining both
//!
//! Run with `RUST_LOG=debug` to see the pipeline actors at work.

use std::time::Duration;

use async_trait::async_trait;
use concord_authority::{spawn_derived, spawn_list_selection, spawn_open, AuthorityConfig};
use concord_core::{CombinedInputs, Snapshot};
use concord_runtime::{spawn, telemetry, Actor, Context, SpawnOptions};

/// Value type shared by the summary's two inputs
#[derive(Clone, Debug)]
enum Part {
    Fruits(Option<Vec<&'static str>>),
    Choice(Option<&'static str>),
}

/// Prints every summary it receives
struct Printer;

#[async_trait]
impl Actor for Printer {
    type Message = Snapshot<String>;

    async fn handle(&mut self, snapshot: Snapshot<String>, _ctx: &mut Context<Snapshot<String>>) {
        println!("  {:<40} {:?}", snapshot.value, snapshot.version);
    }
}

async fn step(title: &str) {
    // Let the pipelines settle before the next edit
    tokio::time::sleep(Duration::from_millis(100)).await;
    println!();
    println!("» {}", title);
}

#[tokio::main]
async fn main() {
    telemetry::init_with_default("warn");

    println!("╔════════════════════════════════════════════════════════════╗");
    println!("║           Concord Demo - List Selection                    ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    let fruits = spawn_open(Some(vec!["apple", "pear", "plum"]), AuthorityConfig::named("fruits"));
    let choice = spawn_list_selection(fruits.source(), AuthorityConfig::named("choice"));

    let (fruits_id, choice_id) = (fruits.id(), choice.id());
    let summary = spawn_derived(
        vec![fruits.source_map(Part::Fruits), choice.source_map(Part::Choice)],
        move |inputs: &CombinedInputs<Part>, renders: u64| {
            let list = match inputs.get(fruits_id) {
                Some(Part::Fruits(Some(list))) => format!("{} fruits", list.len()),
                _ => "no list".to_string(),
            };
            let selected = match inputs.get(choice_id) {
                Some(Part::Choice(Some(value))) => *value,
                _ => "nothing",
            };
            (format!("#{} {}, {} selected", renders, list, selected), renders + 1)
        },
        AuthorityConfig::named("summary"),
    );

    let printer = spawn(Printer, SpawnOptions::named("printer"));
    summary.subscribe(printer.recipient());

    step("select pear").await;
    choice.select(Some("pear"));

    step("add cherry, pear stays").await;
    fruits.transform(|list| {
        let mut list = list.clone().unwrap_or_default();
        list.push("cherry");
        Some(list)
    });

    step("remove pear, selection clears").await;
    fruits.transform(|list| {
        list.as_ref()
            .map(|list| list.iter().copied().filter(|fruit| *fruit != "pear").collect())
    });

    step("select kiwi, not in the list").await;
    choice.select(Some("kiwi"));

    step("select plum, then the list goes away").await;
    choice.select(Some("plum"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    fruits.replace(None);

    step("shutdown").await;
    summary.stop();
    choice.stop();
    fruits.stop();
    summary.stopped().await;
    choice.stopped().await;
    fruits.stopped().await;
    printer.stop();
    printer.stopped().await;
}
