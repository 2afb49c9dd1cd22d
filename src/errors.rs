use crate::chain::Network;

error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }

    foreign_links {
        Io(::std::io::Error);
    }

    errors {
        InvalidAddress(address: String) {
            description("invalid address")
            display("could not parse invalid address {}", address)
        }

        WrongNetworkAddress(address: String, network: Network, configured: Network) {
            description("address belongs to another network")
            display(
                "provided {} address invalid on configured {} network: {}. \
                 Use a {} configuration to use this address.",
                network, configured, address, network
            )
        }
    }
}
