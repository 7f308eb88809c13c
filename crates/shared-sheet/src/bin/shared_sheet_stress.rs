fn main() -> anyhow::Result<()> {
    shared_sheet::cli::run()
}
