//! fenc 命令行入口
//!
//! 用法：
//!   fenc enc <file or directory path>
//!   fenc dec <file or directory path>
//!
//! 参数错误统一打印 usage 并以状态码 1 退出；所有实际逻辑委托给库。

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;
use std::process::exit;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser, ValueEnum};
use tracing::Level;
use zeroize::Zeroizing;

use fenc::{EncryptOptions, FencError};

#[derive(Parser)]
#[command(name = "fenc", version, about = "Encrypt a file or directory tree with a passphrase")]
struct Cli {
    #[arg(value_enum)]
    mode: Mode,

    #[arg(help = "File or directory path")]
    path: String,

    /// 使用 Argon2id 派生密钥（旧版本无法解密）
    #[arg(long)]
    strong_kdf: bool,

    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Enc,
    Dec,
}

fn main() {
    let program = std::env::args().next().unwrap_or_else(|| "fenc".to_string());

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            eprintln!("{}", FencError::Usage { program });
            exit(1);
        }
    };

    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{e:#}");
        exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let path = normalize_path(&cli.path);
    let path = Path::new(&path);

    match cli.mode {
        Mode::Enc => {
            let key = read_new_passphrase()?;
            let options = if cli.strong_kdf {
                EncryptOptions::default().with_strong_kdf()
            } else {
                EncryptOptions::default()
            };

            let out = fenc::encrypt_with_options(path, &key, &options)?;
            println!("\nencrypted to: {}", out.display());
        }
        Mode::Dec => {
            let key = prompt("enter key")?;
            let out = fenc::decrypt(path, &key)?;
            println!("\ndecrypted to: {}", out.display());
        }
    }

    println!("Successful");
    Ok(())
}

/// 两次输入口令，必须非空且一致
fn read_new_passphrase() -> anyhow::Result<Zeroizing<String>> {
    let key = prompt("enter key")?;
    let retype = prompt("retype key")?;

    if key.is_empty() || key != retype {
        return Err(FencError::KeyMismatch.into());
    }
    Ok(key)
}

/// 读取一行口令并去除首尾空白
///
/// 终端下关闭回显；非终端（脚本、测试）直接从 stdin 读行。
fn prompt(label: &str) -> anyhow::Result<Zeroizing<String>> {
    let raw = if io::stdin().is_terminal() {
        Zeroizing::new(rpassword::prompt_password(format!("{label}: ")).context("read passphrase")?)
    } else {
        eprint!("{label}: ");
        io::stderr().flush()?;
        let mut line = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut line).context("read passphrase")?;
        line
    };

    Ok(Zeroizing::new(raw.trim().to_string()))
}

/// 去掉末尾的 `/`；Windows 下先把 `\` 统一为 `/`
fn normalize_path(raw: &str) -> String {
    #[cfg(windows)]
    let slashed = raw.replace('\\', "/");
    #[cfg(not(windows))]
    let slashed = raw.to_string();
    let trimmed = slashed.trim_end_matches('/');
    if trimmed.is_empty() && !slashed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .init();
}
