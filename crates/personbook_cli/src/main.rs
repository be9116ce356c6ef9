//! Command-line caller for the people façade.
//!
//! # Responsibility
//! - Read configuration once, open the store once, run one operation.
//! - Print operation results as JSON on stdout; diagnostics go to the logger.

use clap::{Parser, Subcommand};
use log::error;
use personbook_core::db::open_target;
use personbook_core::{
    core_version, default_people, default_person, init_logging, Config, NewPerson, PersonId,
    PersonService, SqlitePersonRepository, FOOD_TO_SEARCH, NAME_TO_REMOVE,
};
use serde::Serialize;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "personbook", version, about = "People collection façade")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Insert one person (defaults to the John Doe record)
    Create {
        #[arg(long)]
        name: Option<String>,
        #[arg(long, requires = "name")]
        age: Option<i64>,
        /// Favorite food; repeat for several
        #[arg(long = "food", requires = "name")]
        foods: Vec<String>,
    },
    /// Insert several people from a JSON array (defaults to the sample set)
    CreateMany {
        #[arg(long)]
        json: Option<String>,
    },
    FindByName {
        name: String,
    },
    FindOneByFood {
        food: String,
    },
    FindById {
        id: PersonId,
    },
    /// Append "hamburger" to a person's favorite foods
    FindEditSave {
        id: PersonId,
    },
    /// Set age to 20 on the first person with this name
    FindAndUpdate {
        name: String,
    },
    RemoveById {
        id: PersonId,
    },
    RemoveMany {
        #[arg(default_value = NAME_TO_REMOVE)]
        name: String,
    },
    /// Up to two people who like a food, sorted by name, without age
    QueryChain {
        #[arg(default_value = FOOD_TO_SEARCH)]
        food: String,
    },
    Version,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("personbook_core version={}", core_version());
        return ExitCode::SUCCESS;
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(config.log_level, &config.log_target) {
        eprintln!("logging error: {err}");
        return ExitCode::FAILURE;
    }

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    let target = config.database_target()?;
    let conn = open_target(&target)?;
    let service = PersonService::new(SqlitePersonRepository::try_new(&conn)?);

    match command {
        Command::Create { name, age, foods } => {
            let draft = match name {
                Some(name) => NewPerson {
                    name,
                    age,
                    favorite_foods: foods,
                },
                None => default_person(),
            };
            print_json(&service.create_and_save_person(&draft)?)
        }
        Command::CreateMany { json } => {
            let drafts: Vec<NewPerson> = match json {
                Some(raw) => serde_json::from_str(&raw)?,
                None => default_people(),
            };
            print_json(&service.create_many_people(&drafts)?)
        }
        Command::FindByName { name } => print_json(&service.find_people_by_name(&name)?),
        Command::FindOneByFood { food } => print_json(&service.find_one_by_food(&food)?),
        Command::FindById { id } => print_json(&service.find_person_by_id(id)?),
        Command::FindEditSave { id } => print_json(&service.find_edit_then_save(id)?),
        Command::FindAndUpdate { name } => print_json(&service.find_and_update(&name)?),
        Command::RemoveById { id } => print_json(&service.remove_by_id(id)?),
        Command::RemoveMany { name } => print_json(&service.remove_many_people(&name)?),
        Command::QueryChain { food } => print_json(&service.query_chain(&food)?),
        Command::Version => Ok(()),
    }
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn create_fields_without_name_are_rejected() {
        assert!(Cli::try_parse_from(["personbook", "create", "--age", "5"]).is_err());
        assert!(Cli::try_parse_from(["personbook", "create", "--food", "x"]).is_err());
    }

    #[test]
    fn create_accepts_named_record_or_no_arguments() {
        let cli = Cli::try_parse_from([
            "personbook", "create", "--name", "Ana", "--age", "5", "--food", "x", "--food", "y",
        ])
        .unwrap();
        match cli.command {
            Command::Create { name, age, foods } => {
                assert_eq!(name.as_deref(), Some("Ana"));
                assert_eq!(age, Some(5));
                assert_eq!(foods, vec!["x", "y"]);
            }
            _ => panic!("expected create command"),
        }

        let cli = Cli::try_parse_from(["personbook", "create"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Create { name: None, age: None, .. }
        ));
    }
}
