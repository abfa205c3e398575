use crate::core::context::RunContext;
use crate::core::error::UpkeepResult;
use crate::package::PackageMetadata;
use crate::release::peek_next_version;

/// Print the version the next maintenance release of `package` would get.
///
/// Reads the version file in the package's current checkout; nothing is written.
pub fn run_next_version(ctx: &RunContext, package: &str) -> UpkeepResult<()> {
  let package = ctx.package(package)?;
  let metadata = PackageMetadata::load(&ctx.metadata_path(&package), &package.name)?;
  let next = peek_next_version(&metadata.version_file(&package.root))?;
  println!("{}", next);
  Ok(())
}
