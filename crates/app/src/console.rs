//! Line-oriented front-end: one command per line, one reply per command.
//!
//! The console owns nothing but the current session handle; every command is
//! translated into a `Bank` call and the outcome rendered through `view`.

use std::io::{self, BufRead, Write};

use tracing::debug;

use minibank_auth::SessionError;
use minibank_core::{Money, SessionId};
use minibank_ledger::{AccountNumber, AccountNumberGenerator, LedgerError, RandomAccountNumbers};

use crate::bank::{Bank, BankError};
use crate::view::{self, Dashboard, Operation};

pub const HELP: &str = "\
Commands:
  register <username> <password> <initial deposit>
  login <username> <password>
  logout
  balance
  history [--json]
  withdraw <amount>
  transfer <account number> <amount>
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register {
        username: String,
        password: String,
        deposit: String,
    },
    Login {
        username: String,
        password: String,
    },
    Logout,
    Balance,
    History {
        json: bool,
    },
    Withdraw {
        amount: String,
    },
    Transfer {
        recipient: String,
        amount: String,
    },
    Help,
    Quit,
}

impl Command {
    /// `Ok(None)` for a blank line; `Err` carries a usage message.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match (name.to_ascii_lowercase().as_str(), args) {
            ("register", [username, password, deposit]) => Command::Register {
                username: username.to_string(),
                password: password.to_string(),
                deposit: deposit.to_string(),
            },
            ("register", _) => {
                return Err("Usage: register <username> <password> <initial deposit>".to_string());
            }
            ("login", [username, password]) => Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            ("login", _) => return Err("Usage: login <username> <password>".to_string()),
            ("logout", []) => Command::Logout,
            ("balance", []) => Command::Balance,
            ("history", []) => Command::History { json: false },
            ("history", ["--json"]) => Command::History { json: true },
            ("withdraw", [amount]) => Command::Withdraw {
                amount: amount.to_string(),
            },
            ("withdraw", _) => return Err("Usage: withdraw <amount>".to_string()),
            ("transfer", [recipient, amount]) => Command::Transfer {
                recipient: recipient.to_string(),
                amount: amount.to_string(),
            },
            ("transfer", [_]) | ("transfer", []) => {
                return Err("Please enter a recipient account number and an amount.".to_string());
            }
            ("help", _) => Command::Help,
            ("quit", _) | ("exit", _) => Command::Quit,
            _ => return Err(format!("Unknown command '{name}'. Type 'help' for a list.")),
        };

        Ok(Some(command))
    }
}

/// Result of executing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Print this (possibly empty) reply and read the next line.
    Continue(String),
    Quit,
}

pub struct Console<'a, G = RandomAccountNumbers> {
    bank: &'a Bank<G>,
    session: Option<SessionId>,
}

impl<'a, G: AccountNumberGenerator> Console<'a, G> {
    pub fn new(bank: &'a Bank<G>) -> Self {
        Self {
            bank,
            session: None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn execute(&mut self, line: &str) -> Step {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Step::Continue(String::new()),
            Err(usage) => return Step::Continue(usage),
        };

        let reply = match command {
            Command::Register {
                username,
                password,
                deposit,
            } => self.register(&username, &password, &deposit),
            Command::Login { username, password } => self.login(&username, &password),
            Command::Logout => self.logout(),
            Command::Balance => self.balance(),
            Command::History { json } => self.history(json),
            Command::Withdraw { amount } => self.withdraw(&amount),
            Command::Transfer { recipient, amount } => self.transfer(&recipient, &amount),
            Command::Help => HELP.to_string(),
            Command::Quit => {
                self.logout_quietly();
                return Step::Quit;
            }
        };

        Step::Continue(reply)
    }

    fn register(&mut self, username: &str, password: &str, deposit: &str) -> String {
        if self.is_logged_in() {
            return "Please logout before registering a new account.".to_string();
        }

        let result = self
            .parse_deposit(username, password, deposit)
            .and_then(|deposit| self.bank.register(username, password, deposit));

        match result {
            Ok(account) => format!(
                "Registration successful! You can now login.\nYour account number is {}.",
                account.number()
            ),
            Err(error) => view::rejection(Operation::Register, &error),
        }
    }

    fn login(&mut self, username: &str, password: &str) -> String {
        if self.is_logged_in() {
            return "Already logged in. Please logout first.".to_string();
        }

        let session = match self.bank.login(username, password) {
            Ok(session) => session,
            Err(error) => return view::rejection(Operation::Login, &error),
        };
        self.session = Some(session);

        match self.dashboard() {
            Ok(dashboard) => format!("Login successful!\n{dashboard}"),
            Err(error) => view::rejection(Operation::View, &error),
        }
    }

    fn logout(&mut self) -> String {
        if !self.is_logged_in() {
            return view::rejection(Operation::View, &BankError::Session(SessionError::NotLoggedIn));
        }
        self.logout_quietly();
        "Logged out.".to_string()
    }

    fn logout_quietly(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(error) = self.bank.logout(&session) {
                debug!(%error, "session already closed");
            }
        }
    }

    fn balance(&self) -> String {
        match self.dashboard() {
            Ok(dashboard) => format!("Balance: {}", view::amount(dashboard.balance)),
            Err(error) => view::rejection(Operation::View, &error),
        }
    }

    fn history(&self, json: bool) -> String {
        let dashboard = match self.dashboard() {
            Ok(dashboard) => dashboard,
            Err(error) => return view::rejection(Operation::View, &error),
        };

        if !json {
            return dashboard.to_string();
        }
        match dashboard.to_json() {
            Ok(json) => json,
            Err(error) => format!("Could not render history: {error}"),
        }
    }

    fn withdraw(&mut self, amount: &str) -> String {
        let result = self.session().and_then(|session| {
            let amount = parse_amount(amount)?;
            self.bank.withdraw(&session, amount)
        });

        match result {
            Ok(tx) => format!(
                "{} withdrawn successfully!\n{}",
                view::amount(tx.amount),
                self.balance()
            ),
            Err(error) => view::rejection(Operation::Withdraw, &error),
        }
    }

    fn transfer(&mut self, recipient: &str, amount: &str) -> String {
        let result = self.session().and_then(|session| {
            let amount = parse_amount(amount)?;
            let recipient = AccountNumber::new(recipient.trim());
            self.bank.transfer(&session, &recipient, amount)
        });

        match result {
            Ok((out, _)) => format!(
                "{} transferred successfully to {}!\n{}",
                view::amount(out.amount),
                out.counterparty.as_deref().unwrap_or("recipient"),
                self.balance()
            ),
            Err(error) => view::rejection(Operation::Transfer, &error),
        }
    }

    fn session(&self) -> Result<SessionId, BankError> {
        self.session.ok_or(BankError::Session(SessionError::NotLoggedIn))
    }

    fn dashboard(&self) -> Result<Dashboard, BankError> {
        let session = self.session()?;
        let account = self.bank.account(&session)?;
        Ok(Dashboard::from_account(&account))
    }

    /// Unreadable deposit text is an `InvalidDeposit`, but only once the
    /// credential and duplicate-username checks have passed.
    fn parse_deposit(&self, username: &str, password: &str, raw: &str) -> Result<Money, BankError> {
        if let Ok(deposit) = Money::parse(raw) {
            return Ok(deposit);
        }
        self.bank
            .inspect(|ledger| ledger.check_new_identity(username, password).map(drop))??;
        Err(BankError::Ledger(LedgerError::InvalidDeposit {
            minimum: self.bank.config().min_opening_deposit,
        }))
    }
}

fn parse_amount(raw: &str) -> Result<Money, BankError> {
    Money::parse(raw).map_err(|_| BankError::Ledger(LedgerError::InvalidAmount))
}

/// Drive a console over any reader/writer pair until `quit` or end of input.
pub fn run<G, R, W>(bank: &Bank<G>, input: R, mut output: W) -> io::Result<()>
where
    G: AccountNumberGenerator,
    R: BufRead,
    W: Write,
{
    let mut console = Console::new(bank);

    writeln!(output, "Welcome to minibank. Type 'help' for commands.")?;
    prompt(&mut output)?;

    for line in input.lines() {
        match console.execute(&line?) {
            Step::Continue(reply) => {
                if !reply.is_empty() {
                    writeln!(output, "{reply}")?;
                }
            }
            Step::Quit => break,
        }
        prompt(&mut output)?;
    }

    writeln!(output, "Goodbye!")?;
    output.flush()
}

fn prompt(output: &mut impl Write) -> io::Result<()> {
    write!(output, "> ")?;
    output.flush()
}
