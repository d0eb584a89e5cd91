//! # Shell Completion Module
//!
//! Completion scripts for the supported shells. Bash and fish scripts also complete song
//! ids and titles for `similar`, `similar-title` and `show` by calling the hidden
//! `complete-songs` command, which reads the configured catalog.
//!
//! ```bash
//! tuneseek completion bash > ~/.local/share/bash-completion/completions/tuneseek
//! tuneseek completion fish > ~/.config/fish/completions/tuneseek.fish
//! ```

use crate::catalog::Catalog;
use crate::cli::Shell;
use anyhow::Result;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::{self, Write};

/// Subcommands whose positional argument is a song.
const SONG_COMMANDS: [&str; 3] = ["similar", "similar-title", "show"];

/// Generate shell completions for the given shell into `out`
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(gen, cmd, name, out);
}

/// Convert our shell enum to `clap_complete`'s
#[must_use]
pub fn shell_to_completion_shell(shell: &Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Full completion script: clap's static script plus, for bash and fish, song
/// completion through `complete-songs`.
///
/// # Errors
///
/// Fails only if the generated script is not UTF-8.
pub fn completion_script(shell: &Shell, cmd: &mut Command) -> Result<String> {
    let mut buffer = Vec::new();
    generate_completions(shell_to_completion_shell(shell), cmd, &mut buffer);
    let mut script = String::from_utf8(buffer)?;

    let bin = cmd.get_name().to_string();
    match shell {
        Shell::Bash => script.push_str(&bash_song_completion(&bin)),
        Shell::Fish => script.push_str(&fish_song_completion(&bin)),
        Shell::Zsh | Shell::PowerShell | Shell::Elvish => {}
    }
    Ok(script)
}

/// Print the completion script for `shell` to stdout
///
/// # Errors
///
/// See [`completion_script`]; also fails when stdout is closed.
pub fn print_completions(shell: &Shell, cmd: &mut Command) -> Result<()> {
    let script = completion_script(shell, cmd)?;
    io::stdout().write_all(script.as_bytes())?;
    Ok(())
}

fn bash_song_completion(bin: &str) -> String {
    let function = bin.replace('-', "__");
    format!(
        r#"
_{function}_with_songs() {{
    local cur="${{COMP_WORDS[COMP_CWORD]}}"
    if [[ ${{COMP_CWORD}} -ge 2 && "$cur" != -* ]]; then
        case "${{COMP_WORDS[1]}}" in
            {commands})
                local IFS=$'\n'
                COMPREPLY=($(compgen -W "$({bin} complete-songs 2>/dev/null)" -- "$cur"))
                return 0
                ;;
        esac
    fi
    _{function} "$@"
}}
complete -F _{function}_with_songs -o bashdefault -o default {bin}
"#,
        commands = SONG_COMMANDS.join("|"),
    )
}

fn fish_song_completion(bin: &str) -> String {
    format!(
        "\n# Song ids and titles from the catalog\n\
         complete -c {bin} -n '__fish_seen_subcommand_from {commands}' -f -a '({bin} complete-songs 2>/dev/null)' -d 'Song'\n",
        commands = SONG_COMMANDS.join(" "),
    )
}

/// Song ids followed by titles, sorted and without duplicates.
#[must_use]
pub fn song_completions(catalog: &Catalog) -> Vec<String> {
    let mut completions: Vec<String> = catalog
        .all_songs()
        .flat_map(|song| [song.id.clone(), song.title.clone()])
        .filter(|value| !value.is_empty())
        .collect();

    completions.sort();
    completions.dedup();
    completions
}

/// Quote a completion for shells that split on whitespace.
#[must_use]
pub fn quote_completion(completion: &str) -> String {
    if completion.contains(' ') || completion.contains('\t') || completion.contains('\n') {
        format!("\"{}\"", completion.replace('"', "\\\""))
    } else {
        completion.to_string()
    }
}

/// Print song completions, one per line
pub fn print_song_completions(catalog: &Catalog) {
    for completion in song_completions(catalog) {
        println!("{}", quote_completion(&completion));
    }
}
