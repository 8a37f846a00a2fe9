//! Curated usage examples shown by the `examples` subcommand.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};

struct UsageExample {
    description: &'static str,
    command: &'static str,
    output: &'static str,
}

const EXAMPLES: &[UsageExample] = &[
    UsageExample {
        description: "Search for files containing a specific keyword in the src directory.",
        command: "incant search for files containing keyword in src directory",
        output: "grep -r \"keyword\" src",
    },
    UsageExample {
        description: "Process a CSV file to extract a column and count unique occurrences of a value.",
        command: "incant count the number of unique values that appear in the second column of a csv file, make sure the count is case insensitive, report the total count only",
        output: "awk -F, '{print tolower($2)}' file.csv | sort -u | wc -l",
    },
    UsageExample {
        description: "Change contents of a file to uppercase.",
        command: "incant change the contents of a file to uppercase and save the results back to the same file",
        output: "tr '[:lower:]' '[:upper:]' < file.txt > temp.txt && mv temp.txt file.txt",
    },
    UsageExample {
        description: "Find all files with a specific extension in a directory.",
        command: "incant find all files ending in .ext",
        output: "find . -type f -name '*.ext'",
    },
    UsageExample {
        description: "Find and replace a string in multiple files.",
        command: "incant find and replace \"old\" with \"new\" in multiple files",
        output: "find . -type f -exec sed -i 's/old/new/g' {} +",
    },
    UsageExample {
        description: "Call an authenticated API and pass in some JSON data.",
        command: "incant call an api that returns JSON and sends some data {\"foo\":\"bar\"} as json where the api uses basic auth and the secret is an environment variable called API_KEY",
        output: "curl -X POST -H 'Content-Type: application/json' -H 'Authorization: Basic $API_KEY' -d '{\"foo\":\"bar\"}' https://api.example.com/endpoint",
    },
];

/// How many examples print before asking whether to continue.
const INITIAL_COUNT: usize = 3;

fn format_examples(examples: &[UsageExample]) -> String {
    let mut rendered = String::new();
    for example in examples {
        rendered.push('\n');
        rendered.push_str(&format!("Description: {}\n\n", example.description));
        rendered.push_str(&format!("    {}\n\n", example.command));
        rendered.push_str(&format!("    Sample output:\n\n    {}\n", example.output));
    }
    rendered
}

/// Print the curated examples, asking before showing the longer tail.
pub fn show<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<()> {
    writeln!(
        output,
        "incant is a command line tool that converts natural language descriptions \
         of tasks you want to complete in your terminal into valid Unix commands. \
         Here are some examples."
    )?;
    writeln!(output, "{}", format_examples(&EXAMPLES[..INITIAL_COUNT]))?;

    write!(output, "Do you want to see more examples? (y/n) ")?;
    output.flush()?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("failed to read answer")?;
    let answer = answer.trim().to_ascii_lowercase();
    if answer == "y" || answer == "yes" {
        writeln!(output, "{}", format_examples(&EXAMPLES[INITIAL_COUNT..]))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show_with(reply: &str) -> String {
        let mut input = reply.as_bytes();
        let mut output = Vec::new();
        show(&mut input, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_show_prints_the_first_examples() {
        let shown = show_with("n\n");
        assert!(shown.contains("grep -r \"keyword\" src"));
        assert!(shown.contains("Description: Change contents of a file to uppercase."));
        // The tail is held back until the user asks for it
        assert!(!shown.contains("find . -type f -name '*.ext'"));
    }

    #[test]
    fn test_affirmative_answer_shows_the_rest() {
        let shown = show_with("y\n");
        assert!(shown.contains("find . -type f -name '*.ext'"));
        assert!(shown.contains("sed -i 's/old/new/g'"));
    }

    #[test]
    fn test_every_example_pairs_prompt_with_command() {
        for example in EXAMPLES {
            assert!(example.command.starts_with("incant "));
            assert!(!example.description.is_empty());
            assert!(!example.output.is_empty());
        }
    }
}
