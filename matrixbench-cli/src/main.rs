fn main() -> anyhow::Result<()> {
    matrixbench_cli::run()
}
