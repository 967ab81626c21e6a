// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .value_parser(value_parser!(i64))
        .required(true)
        .help("Row id")
}

fn user_cmd() -> Command {
    Command::new("user")
        .about("Manage users and the acting user")
        .subcommand(
            Command::new("add")
                .about("Register a user")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("email").long("email").required(true)),
        )
        .subcommand(Command::new("list").about("List users"))
        .subcommand(
            Command::new("use")
                .about("Set the default acting user")
                .arg(Arg::new("email").long("email").required(true)),
        )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and inspect ledger entries")
        .subcommand(
            Command::new("add")
                .about("Record an income or expense entry")
                .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD").required(true))
                .arg(Arg::new("title").long("title").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(
                    Arg::new("kind")
                        .long("kind")
                        .value_name("income|expense")
                        .required(true),
                )
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("note").long("note")),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List entries, newest first")
                .arg(Arg::new("month").long("month").value_name("YYYY-MM"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("kind").long("kind").value_name("income|expense"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(
            Command::new("edit")
                .about("Edit an entry you own; only the given fields change")
                .arg(id_arg())
                .arg(Arg::new("date").long("date").value_name("YYYY-MM-DD"))
                .arg(Arg::new("title").long("title"))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("kind").long("kind").value_name("income|expense"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("note").long("note")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete an entry you own")
                .arg(id_arg()),
        )
}

fn sub_cmd() -> Command {
    Command::new("sub")
        .about("Manage recurring subscriptions")
        .subcommand(
            Command::new("add")
                .about("Add a subscription; the first charge is due at the start date")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(Arg::new("category").long("category").required(true))
                .arg(
                    Arg::new("period")
                        .long("period")
                        .value_name("monthly|yearly")
                        .required(true),
                )
                .arg(
                    Arg::new("start")
                        .long("start")
                        .value_name("YYYY-MM-DD")
                        .help("Defaults to today"),
                ),
        )
        .subcommand(json_flags(Command::new("list").about("List subscriptions")))
        .subcommand(
            Command::new("pause")
                .about("Stop posting charges for a subscription")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("resume")
                .about("Resume a paused subscription")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a subscription")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("process")
                .about("Post recurring charges that have come due"),
        )
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Category spending caps")
        .subcommand(
            Command::new("set")
                .about("Create or update the cap for a category")
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("cap").long("cap").required(true)),
        )
        .subcommand(json_flags(Command::new("list").about("List budgets")))
        .subcommand(
            Command::new("rm")
                .about("Delete the budget for a category")
                .arg(Arg::new("category").long("category").required(true)),
        )
        .subcommand(json_flags(
            Command::new("report")
                .about("Spend vs cap for a month")
                .arg(Arg::new("month").long("month").value_name("YYYY-MM")),
        ))
}

fn goal_cmd() -> Command {
    Command::new("goal")
        .about("Savings goals")
        .subcommand(
            Command::new("add")
                .about("Create a savings goal")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("target").long("target").required(true))
                .arg(
                    Arg::new("date")
                        .long("date")
                        .value_name("YYYY-MM-DD")
                        .required(true),
                ),
        )
        .subcommand(json_flags(Command::new("list").about("List goals")))
        .subcommand(
            Command::new("fund")
                .about("Add money to a goal")
                .arg(id_arg())
                .arg(Arg::new("amount").long("amount").required(true)),
        )
        .subcommand(
            Command::new("extend")
                .about("Push the target date out by 30 days")
                .arg(id_arg()),
        )
        .subcommand(Command::new("rm").about("Delete a goal").arg(id_arg()))
        .subcommand(json_flags(
            Command::new("outlook")
                .about("Pacing and feasibility for every goal"),
        ))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Period summaries and exports")
        .subcommand(json_flags(
            Command::new("summary")
                .about("Aggregate one month")
                .arg(Arg::new("month").long("month").value_name("YYYY-MM")),
        ))
        .subcommand(json_flags(
            Command::new("history").about("Monthly income/expense history"),
        ))
        .subcommand(
            Command::new("export")
                .about("Write a month's report to a file")
                .arg(Arg::new("month").long("month").value_name("YYYY-MM"))
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_name("csv|json")
                        .required(true),
                )
                .arg(Arg::new("out").long("out").value_name("FILE").required(true)),
        )
}

fn advisor_cmd() -> Command {
    Command::new("advisor")
        .about("Ask the finance advisor (needs GROQ_API_KEY)")
        .subcommand(
            Command::new("ask")
                .about("Ask a question with your financial snapshot as context")
                .arg(Arg::new("message").long("message").required(true))
                .arg(Arg::new("model").long("model")),
        )
}

pub fn build_cli() -> Command {
    Command::new("moneta")
        .about("Moneta: personal finance with recurring charges, budgets, and savings goals")
        .version(clap::crate_version!())
        .arg(
            Arg::new("user")
                .long("user")
                .value_name("EMAIL")
                .global(true)
                .help("Act as this user instead of the configured default"),
        )
        .subcommand(Command::new("init").about("Initialize the database"))
        .subcommand(user_cmd())
        .subcommand(tx_cmd())
        .subcommand(sub_cmd())
        .subcommand(budget_cmd())
        .subcommand(goal_cmd())
        .subcommand(
            json_flags(
                Command::new("dashboard")
                    .about("Post due charges, then show the month at a glance")
                    .arg(Arg::new("month").long("month").value_name("YYYY-MM")),
            ),
        )
        .subcommand(report_cmd())
        .subcommand(advisor_cmd())
        .subcommand(Command::new("doctor").about("Check the ledger for suspicious data"))
}
