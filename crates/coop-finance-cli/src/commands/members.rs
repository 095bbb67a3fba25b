use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::Args;

use coop_finance_core::member::MemberForm;

use crate::{output, store};

#[derive(Args)]
pub struct AddMemberArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    /// Contact phone
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Join date (default: today)
    #[arg(long)]
    pub join_date: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args)]
pub struct MemberIdArgs {
    /// Member id
    pub id: String,
}

pub fn run_add(args: AddMemberArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    let member = coop.add_member(MemberForm {
        name: args.name,
        phone: args.phone,
        join_date: args.join_date.unwrap_or_else(|| Utc::now().date_naive()),
        notes: args.notes,
    });
    store::save(&coop, &mut store)?;
    println!("{}", member.id);
    Ok(())
}

pub fn run_list(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (coop, _store) = store::load(file)?;
    output::print_members(coop.members(), &coop.config().currency_symbol);
    Ok(())
}

pub fn run_retire(args: MemberIdArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    coop.retire_member(&args.id)?;
    store::save(&coop, &mut store)
}

pub fn run_remove(args: MemberIdArgs, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coop, mut store) = store::load(file)?;
    coop.delete_member(&args.id)?;
    store::save(&coop, &mut store)
}
