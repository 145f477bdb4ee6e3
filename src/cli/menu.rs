//! Interactive menu front end.
//!
//! Finite-state loop over stdin: one stage selection per iteration,
//! terminating only on an explicit quit input. Each selection goes
//! through the same dispatcher as one-shot mode.

use pipeline_core::{PipelineConfig, PipelineResult, StageId};
use pipeline_stages::Dispatcher;
use std::io::{BufRead, Write};

#[derive(Debug, PartialEq)]
enum MenuState {
    AwaitingSelection,
    Executing(StageId),
    Terminated,
}

/// Run the menu loop until the quit input (or end of input).
pub async fn run<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    dispatcher: &Dispatcher,
    config: &PipelineConfig,
) -> PipelineResult<()> {
    let mut state = MenuState::AwaitingSelection;

    loop {
        state = match state {
            MenuState::AwaitingSelection => {
                print_menu(output)?;
                match read_line(input)? {
                    Some(line) => select(&line, input, output)?,
                    // end of input behaves like quit
                    None => MenuState::Terminated,
                }
            }
            MenuState::Executing(id) => {
                let results = dispatcher.run_batch(&[id], config).await?;
                for (stage, result) in &results {
                    writeln!(output, "{}: {} ({})", stage, result.status, result.summary)?;
                }
                MenuState::AwaitingSelection
            }
            MenuState::Terminated => {
                writeln!(output, "Exiting the program.")?;
                return Ok(());
            }
        };
    }
}

/// Map one selection line to the next state. Unknown input re-prompts.
fn select<R: BufRead, W: Write>(
    line: &str,
    input: &mut R,
    output: &mut W,
) -> PipelineResult<MenuState> {
    let state = match line.trim() {
        "q" | "Q" => MenuState::Terminated,
        "1" => MenuState::Executing(StageId::SymbolVerification),
        "2" => MenuState::Executing(StageId::DataCollection),
        "3" => MenuState::Executing(StageId::Preprocess),
        "4" => MenuState::Executing(StageId::Dna),
        "5" => MenuState::Executing(StageId::TrainPreparation),
        "6" => {
            write!(output, "   Choose an option (1 or 2): ")?;
            output.flush()?;
            match read_line(input)?.as_deref().map(str::trim) {
                Some("1") => MenuState::Executing(StageId::Train),
                Some("2") => MenuState::Executing(StageId::Predict),
                Some(other) => {
                    writeln!(output, "Unknown option '{}'", other)?;
                    MenuState::AwaitingSelection
                }
                None => MenuState::Terminated,
            }
        }
        other => {
            writeln!(output, "Unknown selection '{}'", other)?;
            MenuState::AwaitingSelection
        }
    };
    Ok(state)
}

fn print_menu<W: Write>(output: &mut W) -> PipelineResult<()> {
    writeln!(output, "1. Stock Symbol Verification")?;
    writeln!(output, "2. Stock Data Collection")?;
    writeln!(output, "3. Stock Preprocessor")?;
    writeln!(output, "4. Stock DNA")?;
    writeln!(output, "5. Train Preparation")?;
    writeln!(output, "6. Model")?;
    writeln!(output, "   6.1 Model Training")?;
    writeln!(output, "   6.2 Model Prediction")?;
    writeln!(output, "Q. Quit")?;
    write!(output, "Choose an option (1-6, Q to quit): ")?;
    output.flush()?;
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> PipelineResult<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line)?;
    if read == 0 {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}
