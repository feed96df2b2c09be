//! Embeds git metadata for `cropwise::version_string()`.

use vergen_gitcl::{Emitter, Gitcl};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Outside a git checkout vergen emits warnings and the
    // `option_env!` fallbacks in `version.rs` report "unknown".
    let git = Gitcl::builder().branch(true).sha(true).dirty(true).build();

    Emitter::default().add_instructions(&git)?.emit()?;

    Ok(())
}
