//! 终端交互：密码输入与 y/N 确认

use std::io::{self, BufRead, IsTerminal, Write};

use crate::interfaces::cli::CliError;

/// 从不同来源获取密码
///
/// 优先级：`--stdin` > `--password` > 交互式输入
pub fn get_password(
    password: Option<String>,
    stdin: bool,
    confirm: bool,
) -> Result<String, CliError> {
    if stdin {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| CliError::CommandError(format!("Failed to read from stdin: {}", e)))?;
        Ok(line.trim().to_string())
    } else if let Some(pwd) = password {
        Ok(pwd)
    } else {
        prompt_password(confirm)
    }
}

fn prompt_password(confirm: bool) -> Result<String, CliError> {
    if !io::stdin().is_terminal() {
        return Err(CliError::CommandError(
            "No password provided. Use --password or --stdin flag, or run interactively."
                .to_string(),
        ));
    }

    let password = read_hidden("Password: ")?;
    if confirm && read_hidden("Confirm password: ")? != password {
        return Err(CliError::CommandError("Passwords do not match".to_string()));
    }
    Ok(password)
}

fn read_hidden(prompt: &str) -> Result<String, CliError> {
    print!("{}", prompt);
    io::stdout()
        .flush()
        .map_err(|e| CliError::CommandError(e.to_string()))?;
    rpassword::read_password()
        .map_err(|e| CliError::CommandError(format!("Failed to read password: {}", e)))
}

/// 读取一行 y/N；读取失败视为否
pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(_) => input.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}
