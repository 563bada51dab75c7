fn main() -> anyhow::Result<()> {
    healthconnect_lib::run()
}
