fn main() -> anyhow::Result<()> {
    fmi_sim::entrypoint()
}
