#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use reward_ledger::{RewardLedgerContract, RewardLedgerContractClient};
use soroban_sdk::testutils::{Address as _, Ledger};
use soroban_sdk::{token, Address, Env};

const STAKERS: usize = 4;

#[derive(Arbitrary, Debug)]
enum Op {
    Stake { who: u8, amount: u32 },
    Withdraw { who: u8, amount: u32 },
    Claim { who: u8 },
    Exit { who: u8 },
    Fund { amount: u32 },
    SetDuration { seconds: u16 },
    Warp { seconds: u16 },
}

fuzz_target!(|ops: Vec<Op>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1);

    let issuer = Address::generate(&env);
    let stake_sac = env.register_stellar_asset_contract_v2(issuer.clone());
    let reward_sac = env.register_stellar_asset_contract_v2(issuer);
    let stake_admin = token::StellarAssetClient::new(&env, &stake_sac.address());
    let reward_admin = token::StellarAssetClient::new(&env, &reward_sac.address());

    let contract_id = env.register(RewardLedgerContract, ());
    let client = RewardLedgerContractClient::new(&env, &contract_id);
    let controller = Address::generate(&env);
    client.initialize(&controller, &stake_sac.address(), &reward_sac.address(), &3_600);

    let stakers: Vec<Address> = (0..STAKERS)
        .map(|_| {
            let staker = Address::generate(&env);
            stake_admin.mint(&staker, &(u32::MAX as i128 * 64));
            staker
        })
        .collect();

    let mut funded: i128 = 0;
    let mut claimed: i128 = 0;
    let mut last_rpt: i128 = 0;

    for op in ops.iter().take(64) {
        match *op {
            Op::Stake { who, amount } => {
                let _ = client.try_stake(&stakers[who as usize % STAKERS], &(amount as i128));
            }
            Op::Withdraw { who, amount } => {
                let _ = client.try_withdraw(&stakers[who as usize % STAKERS], &(amount as i128));
            }
            Op::Claim { who } => {
                if let Ok(Ok(paid)) = client.try_claim(&stakers[who as usize % STAKERS]) {
                    claimed += paid;
                }
            }
            Op::Exit { who } => {
                if let Ok(Ok(paid)) = client.try_exit(&stakers[who as usize % STAKERS]) {
                    claimed += paid;
                }
            }
            Op::Fund { amount } => {
                let amount = amount as i128;
                reward_admin.mint(&contract_id, &amount);
                if let Ok(Ok(())) = client.try_notify_reward_amount(&controller, &amount) {
                    funded += amount;
                }
            }
            Op::SetDuration { seconds } => {
                let _ = client.try_set_funding_window_duration(&controller, &(seconds as u64));
            }
            Op::Warp { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now + seconds as u64);
            }
        }

        let balances: i128 = stakers.iter().map(|s| client.balance_of(s)).sum();
        assert_eq!(client.total_staked(), balances);

        let rpt = client.reward_per_token_stored();
        assert!(rpt >= last_rpt);
        last_rpt = rpt;

        let owed: i128 = stakers.iter().map(|s| client.earned(s)).sum();
        assert!(claimed + owed <= funded);
        assert!(client.reward_committed() >= owed);
    }
});
